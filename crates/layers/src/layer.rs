/// Which renderable view a layer is drawn on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    Flat,
    Globe,
}

/// Dataset + surface combination a style and a render pass apply to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerKind {
    CountryFlat,
    StateFlat,
    CountryGlobe,
}

impl LayerKind {
    pub const ALL: [LayerKind; 3] = [
        LayerKind::CountryFlat,
        LayerKind::StateFlat,
        LayerKind::CountryGlobe,
    ];

    pub fn surface(self) -> SurfaceKind {
        match self {
            LayerKind::CountryFlat | LayerKind::StateFlat => SurfaceKind::Flat,
            LayerKind::CountryGlobe => SurfaceKind::Globe,
        }
    }

    /// Stable identifier used in logs and configuration keys.
    pub fn as_str(self) -> &'static str {
        match self {
            LayerKind::CountryFlat => "country-flat",
            LayerKind::StateFlat => "state-flat",
            LayerKind::CountryGlobe => "country-globe",
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{LayerKind, SurfaceKind};

    #[test]
    fn only_the_globe_layer_targets_the_globe() {
        let globe: Vec<_> = LayerKind::ALL
            .into_iter()
            .filter(|k| k.surface() == SurfaceKind::Globe)
            .collect();
        assert_eq!(globe, vec![LayerKind::CountryGlobe]);
    }
}
