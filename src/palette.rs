//! Palette loading: tile colours and selection weights, btop-style `symbol[name]="#hex"` file.

use crate::grid::ColorId;
use std::path::Path;
use thiserror::Error;

/// Weight given to a symbol whose file entry has no `weight[...]` line.
pub const DEFAULT_WEIGHT: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// One palette entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Swatch {
    pub name: String,
    pub rgb: Rgb,
    pub weight: u32,
}

/// Tile colours and weights. Validated on construction, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    swatches: Vec<Swatch>,
}

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    #[error("invalid weight for {name}: {value}")]
    InvalidWeight { name: String, value: String },
    #[error("weight given for unknown symbol {0}")]
    UnknownSymbol(String),
    #[error("palette has no colours")]
    Empty,
    #[error("palette has {0} colours, at most 255 are supported")]
    TooLarge(usize),
    #[error("{colors} colours but {weights} weights")]
    WeightCount { colors: usize, weights: usize },
    #[error("all weights are zero")]
    ZeroWeights,
}

impl Default for Palette {
    fn default() -> Self {
        Self::balanced()
    }
}

/// Nineteen balanced colours.
const BALANCED: [(&str, &str); 19] = [
    ("red", "#FF0000"),
    ("green", "#00FF00"),
    ("blue", "#0000FF"),
    ("yellow", "#FFFF00"),
    ("orange", "#FFA500"),
    ("purple", "#800080"),
    ("cyan", "#00FFFF"),
    ("pink", "#FFC0CB"),
    ("brown", "#A52A2A"),
    ("gray", "#808080"),
    ("teal", "#008080"),
    ("hot_pink", "#FF69B4"),
    ("dark_green", "#006400"),
    ("tan", "#D2B48C"),
    ("navy", "#000080"),
    ("light_blue", "#ADD8E6"),
    ("deep_pink", "#FF1493"),
    ("indigo", "#4B0082"),
    ("forest_green", "#228B22"),
];

impl Palette {
    /// Builds a palette from colours and a parallel weight list.
    pub fn new(colors: Vec<(String, Rgb)>, weights: &[u32]) -> Result<Self, PaletteError> {
        if colors.is_empty() || weights.is_empty() {
            return Err(PaletteError::Empty);
        }
        if colors.len() != weights.len() {
            return Err(PaletteError::WeightCount {
                colors: colors.len(),
                weights: weights.len(),
            });
        }
        let swatches = colors
            .into_iter()
            .zip(weights)
            .map(|((name, rgb), &weight)| Swatch { name, rgb, weight })
            .collect();
        Self::from_swatches(swatches)
    }

    pub fn from_swatches(swatches: Vec<Swatch>) -> Result<Self, PaletteError> {
        if swatches.is_empty() {
            return Err(PaletteError::Empty);
        }
        if swatches.len() > usize::from(u8::MAX) {
            return Err(PaletteError::TooLarge(swatches.len()));
        }
        if swatches.iter().all(|s| s.weight == 0) {
            return Err(PaletteError::ZeroWeights);
        }
        Ok(Self { swatches })
    }

    /// The built-in palette: 19 colours, equal weight.
    pub fn balanced() -> Self {
        let swatches = BALANCED
            .iter()
            .map(|&(name, hex)| Swatch {
                name: name.to_string(),
                rgb: parse_hex(hex).unwrap_or(Rgb(0, 0, 0)),
                weight: DEFAULT_WEIGHT,
            })
            .collect();
        Self { swatches }
    }

    /// Load from a palette file, or the built-in palette when `path` is None.
    pub fn load(path: Option<&Path>) -> Result<Self, PaletteError> {
        match path {
            Some(p) => {
                let s = std::fs::read_to_string(p)?;
                Self::parse(&s)
            }
            None => Ok(Self::balanced()),
        }
    }

    /// Parse palette text. Symbols keep file order.
    pub fn parse(s: &str) -> Result<Self, PaletteError> {
        let mut swatches: Vec<Swatch> = Vec::new();
        let mut weights: Vec<(String, String)> = Vec::new();
        for (section, key, value) in parse_entries(s) {
            match section {
                "symbol" => {
                    let rgb = parse_hex(&value)?;
                    if let Some(existing) = swatches.iter_mut().find(|sw| sw.name == key) {
                        existing.rgb = rgb;
                    } else {
                        swatches.push(Swatch {
                            name: key.to_string(),
                            rgb,
                            weight: DEFAULT_WEIGHT,
                        });
                    }
                }
                "weight" => weights.push((key.to_string(), value)),
                _ => {}
            }
        }
        for (name, value) in weights {
            let weight = value
                .trim()
                .parse::<u32>()
                .map_err(|_| PaletteError::InvalidWeight {
                    name: name.clone(),
                    value: value.clone(),
                })?;
            match swatches.iter_mut().find(|sw| sw.name == name) {
                Some(sw) => sw.weight = weight,
                None => return Err(PaletteError::UnknownSymbol(name)),
            }
        }
        Self::from_swatches(swatches)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.swatches.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }

    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    pub fn weights(&self) -> Vec<u32> {
        self.swatches.iter().map(|s| s.weight).collect()
    }

    /// Swatch for a tile colour; wraps for ids past the end.
    #[inline]
    pub fn swatch(&self, color: ColorId) -> &Swatch {
        &self.swatches[color.index() % self.swatches.len()]
    }

    pub fn id_of(&self, name: &str) -> Option<ColorId> {
        self.swatches
            .iter()
            .position(|s| s.name == name)
            .map(|i| ColorId(i as u8))
    }
}

/// Split a palette file into (section, key, value) triples: `section[key]="value"`.
fn parse_entries(s: &str) -> Vec<(&str, &str, String)> {
    let mut out = Vec::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(open) = line.find('[') else { continue };
        let section = line[..open].trim();
        let stripped = &line[open + 1..];
        if let Some(end) = stripped.find(']') {
            let key = stripped[..end].trim();
            let rest = stripped[end + 1..].trim();
            if let Some(eq) = rest.find('=') {
                let value = rest[eq + 1..]
                    .trim()
                    .trim_matches('"')
                    .trim_matches('\'')
                    .to_string();
                if !key.is_empty() && !value.is_empty() {
                    out.push((section, key, value));
                }
            }
        }
    }
    out
}

/// Parse hex colour "#RRGGBB" or "#RGB".
pub fn parse_hex(s: &str) -> Result<Rgb, PaletteError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || PaletteError::InvalidHex(s.to_string());
    if !s.is_ascii() {
        return Err(invalid());
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&s[range], 16);
    match s.len() {
        6 => Ok(Rgb(
            channel(0..2).map_err(|_| invalid())?,
            channel(2..4).map_err(|_| invalid())?,
            channel(4..6).map_err(|_| invalid())?,
        )),
        3 => Ok(Rgb(
            channel(0..1).map_err(|_| invalid())? * 17,
            channel(1..2).map_err(|_| invalid())? * 17,
            channel(2..3).map_err(|_| invalid())? * 17,
        )),
        _ => Err(invalid()),
    }
}
