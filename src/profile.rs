//! Property details and presentation settings printed on every invoice.
//!
//! A profile is plain data loaded from JSON.  Any field left out of the file falls back to the
//! built-in Palm Edge Paradise profile, so a file only needs to list what differs.

use std::convert::TryFrom;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use genpdf::style::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a [`HotelProfile`].
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read profile {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse profile {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// An RGB color written as `#RRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    r: u8,
    g: u8,
    b: u8,
}

impl HexColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB`.
    pub fn parse(value: &str) -> Result<Self, String> {
        let hex = value
            .strip_prefix('#')
            .ok_or_else(|| format!("color `{}` must start with `#`", value))?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("color `{}` must have six hexadecimal digits", value));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|err| err.to_string())
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Converts the color into the renderer's representation.
    pub fn to_color(self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }
}

impl TryFrom<String> for HexColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Invoice colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Palette {
    /// Title banner, hotel block and the total bar.
    pub primary: HexColor,
    /// Section banners and the terms heading.
    pub accent: HexColor,
    /// Page tone; the invoice title is printed in it on a primary band.
    pub background: HexColor,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: HexColor::new(0x21, 0x41, 0x32),
            accent: HexColor::new(0x8f, 0x3b, 0x1f),
            background: HexColor::new(0xc6, 0xb1, 0x6e),
        }
    }
}

/// Everything about the property that the invoice prints besides the guest's own data.
///
/// `payment_note`, `accepted_payments`, `terms` and `closing_note` accept `**bold**` markup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct HotelProfile {
    pub name: String,
    pub gstin: String,
    pub address: String,
    pub contact: String,
    pub payment_note: String,
    pub accepted_payments: String,
    pub terms: Vec<String>,
    pub closing_note: String,
    pub footer_note: String,
    /// Large logo shown beside the hotel block.
    pub logo: Option<PathBuf>,
    /// Small emblem shown beside the terms.
    pub small_logo: Option<PathBuf>,
    pub palette: Palette,
}

impl Default for HotelProfile {
    fn default() -> Self {
        Self {
            name: "Palm Edge Paradise".to_owned(),
            gstin: "27ABCFB7144F1ZM".to_owned(),
            address: "PEP FARMS, KHUNTIVALI VILLAGE, BEFORE BENDSHIL, OFF KHARVAI NAKA, \
                      BADLAPUR - NERAL ROAD, BADLAPUR EAST, MAHARASHTRA - 421503"
                .to_owned(),
            contact: "+91-8657570994/ pepfarms.official@gmail.com".to_owned(),
            payment_note: "**Payments:** Advance 25% of package and rest before Checkout"
                .to_owned(),
            accepted_payments:
                "**Accepted Payments:** Cash, UPI Payments, Online Transfer, etc.".to_owned(),
            terms: vec![
                "All rates are inclusive of taxes.".to_owned(),
                "Upon Cancellation advance paid will be forfeited.".to_owned(),
                "Identify proofs to be submitted on arrival".to_owned(),
                "Any damage to the property, whether accidental or wilful, is the \
                 responsibility of the registered guest for the loss incurred & will be \
                 charged for it."
                    .to_owned(),
            ],
            closing_note: "For any queries regarding this invoice or to request a duplicate \
                           copy, please contact us at the provided contact details. Thank you \
                           for choosing Palm Edge Paradise. We hope you had a pleasant stay!"
                .to_owned(),
            footer_note: "*property managed and controlled by BADLAPUR PEP VILLAGE LLP".to_owned(),
            logo: None,
            small_logo: None,
            palette: Palette::default(),
        }
    }
}

impl HotelProfile {
    /// Loads a profile from a JSON file.
    ///
    /// Relative logo paths are resolved against the directory holding the profile.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_owned(),
            source,
        })?;
        let mut profile: HotelProfile =
            serde_json::from_str(&raw).map_err(|source| ProfileError::Json {
                path: path.to_owned(),
                source,
            })?;

        if let Some(base) = path.parent() {
            for logo in [&mut profile.logo, &mut profile.small_logo]
                .into_iter()
                .flatten()
            {
                if logo.is_relative() {
                    *logo = base.join(&*logo);
                }
            }
        }

        Ok(profile)
    }
}
