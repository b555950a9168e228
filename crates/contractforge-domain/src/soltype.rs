//! Solidity type model and type-correct default values
//!
//! The corrector and detector both need to know what a "safe" value looks
//! like for a declared type, including nested generics (arrays of arrays,
//! mappings to arrays). Parsing is intentionally shallow: it understands
//! type syntax, not semantics.

use serde::{Deserialize, Serialize};

/// A parsed Solidity-flavored type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolType {
    /// `string`
    String,
    /// `uint`, `uint8` .. `uint256`
    Uint,
    /// `int`, `int8` .. `int256`
    Int,
    /// `bool`
    Bool,
    /// `address`, `address payable`
    Address,
    /// `bytes1` .. `bytes32`
    FixedBytes(u8),
    /// dynamic `bytes`
    Bytes,
    /// `T[]` with the element type
    Array(Box<SolType>),
    /// `mapping(K => V)`
    Mapping(Box<SolType>, Box<SolType>),
    /// A user-defined or unrecognized type name
    Other(String),
}

impl SolType {
    /// Parses a type expression, recursing into arrays and mappings
    ///
    /// Returns `None` for input that is not a type expression at all.
    pub fn parse(raw: &str) -> Option<SolType> {
        let raw = raw
            .trim()
            .trim_end_matches("memory")
            .trim_end_matches("storage")
            .trim_end_matches("calldata")
            .trim();
        if raw.is_empty() {
            return None;
        }

        // Array suffix binds last: `uint256[][]` is array of array.
        if let Some(base) = raw.strip_suffix("[]") {
            return SolType::parse(base).map(|inner| SolType::Array(Box::new(inner)));
        }

        if let Some(rest) = raw.strip_prefix("mapping") {
            let rest = rest.trim();
            let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
            let arrow = inner.find("=>")?;
            let key = SolType::parse(&inner[..arrow])?;
            let value = SolType::parse(&inner[arrow + 2..])?;
            return Some(SolType::Mapping(Box::new(key), Box::new(value)));
        }

        let ident = raw.trim_end_matches("payable").trim();
        let parsed = match ident {
            "string" => SolType::String,
            "bool" => SolType::Bool,
            "address" => SolType::Address,
            "bytes" => SolType::Bytes,
            _ if ident.starts_with("uint") && ident[4..].chars().all(|c| c.is_ascii_digit()) => {
                SolType::Uint
            }
            _ if ident.starts_with("int") && ident[3..].chars().all(|c| c.is_ascii_digit()) => {
                SolType::Int
            }
            _ if ident.starts_with("bytes") => {
                let width: u8 = ident[5..].parse().ok()?;
                if width == 0 || width > 32 {
                    return None;
                }
                SolType::FixedBytes(width)
            }
            _ if ident.chars().all(|c| c.is_alphanumeric() || c == '_')
                && ident.chars().next().is_some_and(|c| c.is_alphabetic()) =>
            {
                SolType::Other(ident.to_string())
            }
            _ => return None,
        };
        Some(parsed)
    }

    /// The type-correct default expression for this type
    ///
    /// Mappings have no initializer expression in Solidity; their "default"
    /// is the absence of one, represented here as `None`.
    pub fn default_value(&self) -> Option<String> {
        match self {
            SolType::String => Some("\"\"".to_string()),
            SolType::Uint | SolType::Int => Some("0".to_string()),
            SolType::Bool => Some("false".to_string()),
            SolType::Address => Some("address(0)".to_string()),
            SolType::FixedBytes(width) => Some(format!("bytes{}(0)", width)),
            SolType::Bytes => Some("\"\"".to_string()),
            SolType::Array(inner) => Some(format!("new {}[](0)", inner.source_name())),
            SolType::Mapping(_, _) => None,
            SolType::Other(name) => Some(format!("{}(0)", name)),
        }
    }

    /// The type as it would be written in source
    pub fn source_name(&self) -> String {
        match self {
            SolType::String => "string".to_string(),
            SolType::Uint => "uint256".to_string(),
            SolType::Int => "int256".to_string(),
            SolType::Bool => "bool".to_string(),
            SolType::Address => "address".to_string(),
            SolType::FixedBytes(width) => format!("bytes{}", width),
            SolType::Bytes => "bytes".to_string(),
            SolType::Array(inner) => format!("{}[]", inner.source_name()),
            SolType::Mapping(key, value) => {
                format!("mapping({} => {})", key.source_name(), value.source_name())
            }
            SolType::Other(name) => name.clone(),
        }
    }

    /// The default return statement for a function returning this type
    pub fn default_return(&self) -> String {
        match self.default_value() {
            Some(value) => format!("return {};", value),
            // A mapping cannot be returned by value; an empty return is the
            // closest structurally valid completion.
            None => "return;".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_elementary_types() {
        assert_eq!(SolType::parse("string"), Some(SolType::String));
        assert_eq!(SolType::parse("uint256"), Some(SolType::Uint));
        assert_eq!(SolType::parse("uint"), Some(SolType::Uint));
        assert_eq!(SolType::parse("int128"), Some(SolType::Int));
        assert_eq!(SolType::parse("bool"), Some(SolType::Bool));
        assert_eq!(SolType::parse("address"), Some(SolType::Address));
        assert_eq!(SolType::parse("address payable"), Some(SolType::Address));
        assert_eq!(SolType::parse("bytes32"), Some(SolType::FixedBytes(32)));
        assert_eq!(SolType::parse("bytes"), Some(SolType::Bytes));
    }

    #[test]
    fn test_parse_nested_types() {
        assert_eq!(
            SolType::parse("uint256[]"),
            Some(SolType::Array(Box::new(SolType::Uint)))
        );
        assert_eq!(
            SolType::parse("uint256[][]"),
            Some(SolType::Array(Box::new(SolType::Array(Box::new(
                SolType::Uint
            )))))
        );
        assert_eq!(
            SolType::parse("mapping(address => uint256)"),
            Some(SolType::Mapping(
                Box::new(SolType::Address),
                Box::new(SolType::Uint)
            ))
        );
        assert_eq!(
            SolType::parse("mapping(address => uint256[])"),
            Some(SolType::Mapping(
                Box::new(SolType::Address),
                Box::new(SolType::Array(Box::new(SolType::Uint)))
            ))
        );
    }

    #[test]
    fn test_parse_strips_data_location() {
        assert_eq!(SolType::parse("string memory"), Some(SolType::String));
        assert_eq!(
            SolType::parse("uint256[] calldata"),
            Some(SolType::Array(Box::new(SolType::Uint)))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(SolType::parse(""), None);
        assert_eq!(SolType::parse("123abc"), None);
        assert_eq!(SolType::parse("bytes99"), None);
    }

    #[test]
    fn test_default_values() {
        assert_eq!(SolType::String.default_value().unwrap(), "\"\"");
        assert_eq!(SolType::Uint.default_value().unwrap(), "0");
        assert_eq!(SolType::Bool.default_value().unwrap(), "false");
        assert_eq!(SolType::Address.default_value().unwrap(), "address(0)");
        assert_eq!(
            SolType::FixedBytes(32).default_value().unwrap(),
            "bytes32(0)"
        );
        assert_eq!(
            SolType::Array(Box::new(SolType::Uint))
                .default_value()
                .unwrap(),
            "new uint256[](0)"
        );
        assert_eq!(
            SolType::Mapping(Box::new(SolType::Address), Box::new(SolType::Uint)).default_value(),
            None
        );
    }

    #[test]
    fn test_default_return() {
        assert_eq!(SolType::Uint.default_return(), "return 0;");
        assert_eq!(SolType::String.default_return(), "return \"\";");
    }

    #[test]
    fn test_source_name_round_trip() {
        for raw in [
            "string",
            "uint256",
            "bool",
            "address",
            "bytes32",
            "uint256[]",
            "mapping(address => uint256[])",
        ] {
            let parsed = SolType::parse(raw).unwrap();
            assert_eq!(SolType::parse(&parsed.source_name()), Some(parsed));
        }
    }
}
