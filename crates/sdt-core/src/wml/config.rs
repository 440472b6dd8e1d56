//! Content control configuration.
//!
//! [`SdtConfig`] values are immutable once built: every `with_*` method
//! validates its input and returns a new configuration.

use crate::error::{Result, SdtError};
use crate::util::contains_xml_reserved;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MIN_ID: u32 = 10_000_000;
pub const MAX_ID: u32 = 99_999_999;

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("tag pattern compiles"));

/// Kind of content control, mapped 1:1 to the `w:sdtPr` type marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SdtType {
    Group,
    PlainText,
    #[default]
    RichText,
    Picture,
}

impl SdtType {
    /// Canonical (camelCase) name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::PlainText => "plainText",
            Self::RichText => "richText",
            Self::Picture => "picture",
        }
    }

    /// Local name of the `w:sdtPr` child that marks this type.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::PlainText => "text",
            Self::RichText => "richText",
            Self::Picture => "picture",
        }
    }

    /// Inverse of [`SdtType::marker`].
    pub fn from_marker(local_name: &str) -> Option<Self> {
        match local_name {
            "group" => Some(Self::Group),
            "text" => Some(Self::PlainText),
            "richText" => Some(Self::RichText),
            "picture" => Some(Self::Picture),
            _ => None,
        }
    }
}

impl FromStr for SdtType {
    type Err = SdtError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "group" => Ok(Self::Group),
            "plainText" | "plain-text" => Ok(Self::PlainText),
            "richText" | "rich-text" => Ok(Self::RichText),
            "picture" => Ok(Self::Picture),
            other => Err(SdtError::InvalidValue(format!(
                "unknown content control type '{other}'"
            ))),
        }
    }
}

impl fmt::Display for SdtType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LockType {
    #[default]
    None,
    SdtLocked,
    ContentLocked,
    Unlocked,
}

impl LockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::SdtLocked => "sdtLocked",
            Self::ContentLocked => "contentLocked",
            Self::Unlocked => "unlocked",
        }
    }

    /// `w:lock/@w:val`; `None` for [`LockType::None`], which writes no
    /// lock element.
    pub fn attribute_value(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            other => Some(other.as_str()),
        }
    }
}

impl FromStr for LockType {
    type Err = SdtError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(Self::None),
            "sdtLocked" | "sdt-locked" => Ok(Self::SdtLocked),
            "contentLocked" | "content-locked" => Ok(Self::ContentLocked),
            "unlocked" => Ok(Self::Unlocked),
            other => Err(SdtError::InvalidValue(format!(
                "unknown lock value '{other}'"
            ))),
        }
    }
}

impl fmt::Display for LockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! string_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

string_serde!(SdtType);
string_serde!(LockType);

/// Properties of one content control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSdtConfig")]
pub struct SdtConfig {
    id: u32,
    alias: Option<String>,
    tag: Option<String>,
    #[serde(rename = "type")]
    sdt_type: SdtType,
    lock: LockType,
    run_level: bool,
    inline_level: bool,
}

impl SdtConfig {
    /// Rich-text, unlocked, block-level control with the given id.
    pub fn new(id: u32) -> Result<Self> {
        validate_id(id)?;
        Ok(Self {
            id,
            alias: None,
            tag: None,
            sdt_type: SdtType::default(),
            lock: LockType::default(),
            run_level: false,
            inline_level: false,
        })
    }

    /// Parse an 8-digit decimal id.
    pub fn parse_id(s: &str) -> Result<u32> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SdtError::InvalidValue(format!(
                "id '{s}' is not an 8-digit number"
            )));
        }
        let id = s
            .parse()
            .map_err(|_| SdtError::InvalidValue(format!("id '{s}' is not a number")))?;
        validate_id(id)?;
        Ok(id)
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn sdt_type(&self) -> SdtType {
        self.sdt_type
    }

    pub fn lock(&self) -> LockType {
        self.lock
    }

    pub fn run_level(&self) -> bool {
        self.run_level
    }

    pub fn inline_level(&self) -> bool {
        self.inline_level
    }

    pub fn with_id(&self, id: u32) -> Result<Self> {
        validate_id(id)?;
        Ok(Self { id, ..self.clone() })
    }

    /// An empty alias clears it.
    pub fn with_alias(&self, alias: &str) -> Result<Self> {
        Ok(Self {
            alias: validate_alias(alias)?,
            ..self.clone()
        })
    }

    /// An empty tag clears it.
    pub fn with_tag(&self, tag: &str) -> Result<Self> {
        Ok(Self {
            tag: validate_tag(tag)?,
            ..self.clone()
        })
    }

    pub fn with_type(&self, sdt_type: SdtType) -> Self {
        Self {
            sdt_type,
            ..self.clone()
        }
    }

    pub fn with_lock(&self, lock: LockType) -> Self {
        Self {
            lock,
            ..self.clone()
        }
    }

    pub fn with_run_level(&self, run_level: bool) -> Self {
        Self {
            run_level,
            ..self.clone()
        }
    }

    pub fn with_inline_level(&self, inline_level: bool) -> Self {
        Self {
            inline_level,
            ..self.clone()
        }
    }

    /// `tag=…` / `id=…` suffix for diagnostics.
    pub fn describe(&self) -> String {
        match &self.tag {
            Some(tag) => format!(" tag={tag} id={}", self.id),
            None => format!(" id={}", self.id),
        }
    }
}

fn validate_id(id: u32) -> Result<()> {
    if !(MIN_ID..=MAX_ID).contains(&id) {
        return Err(SdtError::InvalidValue(format!(
            "id {id} is outside [{MIN_ID}, {MAX_ID}]"
        )));
    }
    Ok(())
}

fn validate_alias(alias: &str) -> Result<Option<String>> {
    if alias.is_empty() {
        return Ok(None);
    }
    if contains_xml_reserved(alias) {
        return Err(SdtError::InvalidValue(format!(
            "alias '{alias}' contains an XML reserved character"
        )));
    }
    Ok(Some(alias.to_string()))
}

fn validate_tag(tag: &str) -> Result<Option<String>> {
    if tag.is_empty() {
        return Ok(None);
    }
    if contains_xml_reserved(tag) {
        return Err(SdtError::InvalidValue(format!(
            "tag '{tag}' contains an XML reserved character"
        )));
    }
    if !TAG_PATTERN.is_match(tag) {
        return Err(SdtError::InvalidValue(format!(
            "tag '{tag}' must start with a letter or underscore and contain only letters, digits, '-', '_' or '.'"
        )));
    }
    Ok(Some(tag.to_string()))
}

/// Unvalidated wire shape of [`SdtConfig`].
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSdtConfig {
    id: IdRepr,
    #[serde(default)]
    alias: Option<String>,
    #[serde(default)]
    tag: Option<String>,
    #[serde(default, rename = "type")]
    sdt_type: SdtType,
    #[serde(default)]
    lock: LockType,
    #[serde(default)]
    run_level: bool,
    #[serde(default)]
    inline_level: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Number(u32),
    Text(String),
}

impl TryFrom<RawSdtConfig> for SdtConfig {
    type Error = SdtError;

    fn try_from(raw: RawSdtConfig) -> Result<Self> {
        let id = match raw.id {
            IdRepr::Number(n) => n,
            IdRepr::Text(s) => Self::parse_id(&s)?,
        };
        let mut config = Self::new(id)?
            .with_type(raw.sdt_type)
            .with_lock(raw.lock)
            .with_run_level(raw.run_level)
            .with_inline_level(raw.inline_level);
        if let Some(alias) = raw.alias {
            config = config.with_alias(&alias)?;
        }
        if let Some(tag) = raw.tag {
            config = config.with_tag(&tag)?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_range_is_enforced() {
        assert!(SdtConfig::new(MIN_ID).is_ok());
        assert!(SdtConfig::new(MAX_ID).is_ok());
        assert!(SdtConfig::new(9_999_999).is_err());
        assert!(SdtConfig::new(100_000_000).is_err());
    }

    #[test]
    fn id_strings_must_have_eight_digits() {
        assert_eq!(SdtConfig::parse_id("12345678").unwrap(), 12_345_678);
        assert!(SdtConfig::parse_id("1234567").is_err());
        assert!(SdtConfig::parse_id("0123456x").is_err());
        assert!(SdtConfig::parse_id("01234567").is_err());
    }

    #[test]
    fn mutators_return_new_instances() {
        let base = SdtConfig::new(12_345_678).unwrap();
        let tagged = base.with_tag("t1").unwrap();

        assert_eq!(base.tag(), None);
        assert_eq!(tagged.tag(), Some("t1"));
        assert_eq!(tagged.id(), base.id());
    }

    #[test]
    fn reserved_characters_rejected() {
        let base = SdtConfig::new(12_345_678).unwrap();
        assert!(base.with_alias("Tom & Jerry").is_err());
        assert!(base.with_tag("a<b").is_err());
        assert!(base.with_alias("Client name").is_ok());
    }

    #[test]
    fn tag_shape() {
        let base = SdtConfig::new(12_345_678).unwrap();
        assert!(base.with_tag("_client.name-2").is_ok());
        assert!(base.with_tag("1st").is_err());
        assert!(base.with_tag("has space").is_err());
        assert_eq!(base.with_tag("").unwrap().tag(), None);
    }

    #[test]
    fn type_and_lock_strings() {
        assert_eq!("plain-text".parse::<SdtType>().unwrap(), SdtType::PlainText);
        assert_eq!("richText".parse::<SdtType>().unwrap(), SdtType::RichText);
        assert!("checkbox".parse::<SdtType>().is_err());
        assert_eq!("content-locked".parse::<LockType>().unwrap(), LockType::ContentLocked);
        assert_eq!(LockType::None.attribute_value(), None);
        assert_eq!(SdtType::PlainText.marker(), "text");
    }

    #[test]
    fn deserializes_and_validates() {
        let config: SdtConfig = serde_json::from_str(
            r#"{"id":"12345678","tag":"client","type":"plain-text","lock":"sdtLocked"}"#,
        )
        .unwrap();
        assert_eq!(config.id(), 12_345_678);
        assert_eq!(config.sdt_type(), SdtType::PlainText);
        assert_eq!(config.lock(), LockType::SdtLocked);

        assert!(serde_json::from_str::<SdtConfig>(r#"{"id":42}"#).is_err());
        assert!(serde_json::from_str::<SdtConfig>(r#"{"id":12345678,"tag":"9x"}"#).is_err());
        assert!(serde_json::from_str::<SdtConfig>(r#"{"id":12345678,"type":"bogus"}"#).is_err());
    }
}
