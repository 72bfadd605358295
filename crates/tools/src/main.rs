use std::env;
use std::fmt::Write as _;
use std::fs;

use formats::feature_collection::FeatureCollection;
use layers::filter::AllowList;
use layers::layer::LayerKind;
use layers::symbology::{LayerStyle, resolve_style};
use runtime::config::{MapConfig, normalize_permalink_base};
use runtime::pipeline::{LayerPass, PassError, PreparedLayer, prepare_layer};
use streaming::dataset::{DatasetId, DatasetSpec};
use streaming::transport::{HttpResponse, MemoryTransport, Transport};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod http;

use http::ReqwestTransport;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let cmd = args[1].clone();
    args.drain(0..2);

    match cmd.as_str() {
        "inspect" => cmd_inspect(parse_inspect(args)?).await,
        "styles" => cmd_styles(args),
        _ => Err(usage()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InspectArgs {
    dataset: DatasetId,
    source: Option<String>,
    allow: Option<String>,
    base_url: String,
    permalink_base: Option<String>,
}

fn parse_inspect(args: Vec<String>) -> Result<InspectArgs, String> {
    // travel-map inspect <countries|states> [--source URL|PATH] [--allow CSV]
    //     [--base-url URL] [--permalink-base PATH]
    let Some(first) = args.first() else {
        return Err(usage());
    };
    let dataset =
        DatasetId::parse(first).ok_or_else(|| format!("unknown dataset: {first}\n\n{}", usage()))?;

    let mut out = InspectArgs {
        dataset,
        source: None,
        allow: None,
        base_url: String::new(),
        permalink_base: None,
    };

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let slot = match flag {
            "--source" | "--allow" | "--base-url" | "--permalink-base" => {
                i += 1;
                if i >= args.len() {
                    return Err(format!("{flag} requires a value"));
                }
                args[i].clone()
            }
            s => return Err(format!("unknown arg: {s}\n\n{}", usage())),
        };
        match flag {
            "--source" => out.source = Some(slot),
            "--allow" => out.allow = Some(slot),
            "--base-url" => out.base_url = slot,
            _ => out.permalink_base = Some(slot),
        }
        i += 1;
    }
    Ok(out)
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

fn inspect_config(args: &InspectArgs) -> MapConfig {
    let mut config = MapConfig {
        base_url: args.base_url.clone(),
        ..MapConfig::default()
    };
    if let Some(csv) = &args.allow {
        config.allow_list = AllowList::from_csv(csv);
    }
    if let Some(base) = &args.permalink_base {
        config.permalink_base = normalize_permalink_base(base);
    }
    config
}

fn flat_layer_for(dataset: DatasetId) -> LayerKind {
    match dataset {
        DatasetId::Countries => LayerKind::CountryFlat,
        DatasetId::UsStates => LayerKind::StateFlat,
    }
}

async fn cmd_inspect(args: InspectArgs) -> Result<(), String> {
    let config = inspect_config(&args);
    let layer = flat_layer_for(args.dataset);
    let source = args
        .source
        .clone()
        .unwrap_or_else(|| args.dataset.default_url().to_string());
    let pass = LayerPass {
        layer,
        dataset: DatasetSpec::new(args.dataset, source.clone()),
    };

    let report = if is_remote(&source) {
        inspect_with(&ReqwestTransport::new(), &pass, &config).await?
    } else {
        let bytes = tokio::fs::read(&source)
            .await
            .map_err(|e| format!("read {source}: {e}"))?;
        let transport = MemoryTransport::new().with_response(&source, HttpResponse::ok(bytes));
        inspect_with(&transport, &pass, &config).await?
    };
    print!("{report}");
    Ok(())
}

/// Runs one pass and renders the outcome. A soft no-match outcome is a
/// report, not an error.
async fn inspect_with<T: Transport>(
    transport: &T,
    pass: &LayerPass,
    config: &MapConfig,
) -> Result<String, String> {
    debug!(layer = %pass.layer, url = %pass.dataset.url, "inspecting dataset");
    match prepare_layer(transport, pass, config).await {
        Ok(prepared) => Ok(inspect_report(&prepared)),
        Err(err @ PassError::NoMatches) => Ok(format!("{}\n", err.user_message(pass.layer))),
        Err(err) => Err(format!("{} ({err})", err.user_message(pass.layer))),
    }
}

fn inspect_report(prepared: &PreparedLayer) -> String {
    let mut out = String::new();
    for f in &prepared.features {
        let _ = writeln!(
            out,
            "{}\t{}\t{}",
            f.binding.label, f.binding.slug, f.binding.target
        );
    }
    let collection =
        FeatureCollection::new(prepared.features.iter().map(|f| f.feature.clone()).collect());
    let _ = writeln!(out, "{} feature(s) on {}", collection.len(), prepared.layer);
    if let Some(b) = collection.bounds() {
        let c = b.center();
        let _ = writeln!(
            out,
            "bounds: [{:.4}, {:.4}] .. [{:.4}, {:.4}] center [{:.4}, {:.4}]",
            b.min[0], b.min[1], b.max[0], b.max[1], c.lon_deg, c.lat_deg
        );
    }
    out
}

fn cmd_styles(args: Vec<String>) -> Result<(), String> {
    // travel-map styles [--config PATH]
    let config = match args.as_slice() {
        [] => MapConfig::default(),
        [flag, path] if flag == "--config" => {
            let text = fs::read_to_string(path).map_err(|e| format!("read {path}: {e}"))?;
            MapConfig::from_json(&text).map_err(|e| e.to_string())?
        }
        [flag] if flag == "--config" => return Err("--config requires a value".to_string()),
        _ => return Err(usage()),
    };
    print!("{}", styles_report(&config));
    Ok(())
}

fn styles_report(config: &MapConfig) -> String {
    let mut out = String::new();
    for kind in LayerKind::ALL {
        let style = resolve_style(kind, &config.styles);
        let _ = writeln!(out, "{kind}: {}", describe_style(&style));
        if let Some(g) = style.globe {
            let _ = writeln!(
                out,
                "  background {} side {} @ {}",
                g.background_color.to_hex(),
                g.side_color.to_hex(),
                g.side_opacity
            );
        }
    }
    out
}

fn describe_style(style: &LayerStyle) -> String {
    format!(
        "fill {} @ {}, border {} @ {} weight {}",
        style.fill_color.to_hex(),
        style.fill_opacity,
        style.border_color.to_hex(),
        style.border_opacity,
        style.border_weight
    )
}

fn usage() -> String {
    let exe = env::args()
        .next()
        .unwrap_or_else(|| "travel-map".to_string());
    format!(
        "Usage:\n  {exe} inspect <countries|states> [--source URL|PATH] [--allow CSV] [--base-url URL] [--permalink-base PATH]\n  {exe} styles [--config PATH]\n\nNotes:\n- Without --allow the default travel list is used.\n- Set RUST_LOG=debug to see pass progress.\n"
    )
}
