use enum_map::{Enum, EnumMap, enum_map};
use iced_core::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Which session price a label stands for; each gets its own palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Deserialize, Serialize)]
pub enum PriceRole {
    Current,
    Open,
    High,
    Low,
}

/// `Color` stored as `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexColor(pub Color);

impl HexColor {
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self(Color::from_rgb8(r, g, b))
    }

    pub const fn rgba8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self(Color::from_rgba8(r, g, b, a))
    }

    pub fn parse(hex: &str) -> Option<Self> {
        let hex = hex.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();

        match hex.len() {
            6 => Some(Self::rgb8(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba8(
                channel(0)?,
                channel(2)?,
                channel(4)?,
                f32::from(channel(6)?) / 255.0,
            )),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.0.into_rgba8();
        if a == u8::MAX {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

impl From<HexColor> for Color {
    fn from(value: HexColor) -> Self {
        value.0
    }
}

impl Serialize for HexColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        HexColor::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color: {s}")))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Palette {
    pub background: HexColor,
    pub axis: HexColor,
    pub center_line: HexColor,
    pub boundary: HexColor,
    pub reference: HexColor,
    pub ladder: HexColor,
    pub badge_text: HexColor,
    pub badge_background: HexColor,
    pub marker: HexColor,
    pub marker_selected: HexColor,
    pub hover: HexColor,
    pub measure: HexColor,
    pub status_text: HexColor,
    pub error_text: HexColor,
    pub menu_background: HexColor,
    pub menu_text: HexColor,
    pub menu_highlight: HexColor,
    #[serde(deserialize_with = "roles_or_default")]
    pub roles: EnumMap<PriceRole, HexColor>,
}

impl Palette {
    pub fn role(&self, role: PriceRole) -> Color {
        self.roles[role].0
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: HexColor::rgb8(0x18, 0x1a, 0x1f),
            axis: HexColor::rgb8(0x8a, 0x8f, 0x98),
            center_line: HexColor::rgb8(0x5c, 0x63, 0x70),
            boundary: HexColor::rgb8(0xc8, 0xa8, 0x5a),
            reference: HexColor::rgba8(0xc8, 0xa8, 0x5a, 0.35),
            ladder: HexColor::rgb8(0x6b, 0x72, 0x80),
            badge_text: HexColor::rgb8(0xe5, 0xe7, 0xeb),
            badge_background: HexColor::rgb8(0x2a, 0x2e, 0x36),
            marker: HexColor::rgb8(0x4e, 0xa1, 0xff),
            marker_selected: HexColor::rgb8(0xff, 0xd2, 0x4d),
            hover: HexColor::rgba8(0xff, 0xff, 0xff, 0.5),
            measure: HexColor::rgb8(0xc6, 0x78, 0xdd),
            status_text: HexColor::rgb8(0x9c, 0xa3, 0xaf),
            error_text: HexColor::rgb8(0xef, 0x53, 0x50),
            menu_background: HexColor::rgb8(0x22, 0x26, 0x2e),
            menu_text: HexColor::rgb8(0xe5, 0xe7, 0xeb),
            menu_highlight: HexColor::rgb8(0x3a, 0x40, 0x4c),
            roles: default_roles(),
        }
    }
}

fn default_roles() -> EnumMap<PriceRole, HexColor> {
    enum_map! {
        PriceRole::Current => HexColor::rgb8(0xf5, 0xf5, 0xf5),
        PriceRole::Open => HexColor::rgb8(0x61, 0xaf, 0xef),
        PriceRole::High => HexColor::rgb8(0x51, 0xcf, 0x66),
        PriceRole::Low => HexColor::rgb8(0xff, 0x6b, 0x6b),
    }
}

fn roles_or_default<'de, D>(deserializer: D) -> Result<EnumMap<PriceRole, HexColor>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(EnumMap::deserialize(value).unwrap_or_else(|_| default_roles()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrips_with_and_without_alpha() {
        let opaque = HexColor::parse("#4ea1ff").unwrap();
        assert_eq!(opaque.to_hex(), "#4ea1ff");

        let translucent = HexColor::parse("#ffffff80").unwrap();
        assert_eq!(translucent.to_hex(), "#ffffff80");

        assert!(HexColor::parse("4ea1ff").is_none());
        assert!(HexColor::parse("#4ea1f").is_none());
        assert!(HexColor::parse("#zzzzzz").is_none());
    }

    #[test]
    fn broken_roles_fall_back_to_defaults() {
        let json = r##"{ "background": "#000000", "roles": { "Current": "nope" } }"##;
        let palette: Palette = serde_json::from_str(json).unwrap();

        assert_eq!(palette.background.to_hex(), "#000000");
        assert_eq!(palette.roles, default_roles());
    }
}
