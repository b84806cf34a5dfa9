//! PostgreSQL type mapper
//!
//! Maps PostgreSQL type OIDs to the type names printed by the plain dialect
//! and to the literal category of their values.

use crate::common::TypeCategory;

/// Maps PostgreSQL OID types to display names and literal categories
///
/// Reference: <https://www.postgresql.org/docs/current/datatype.html>
pub struct PostgresTypeMapper;

impl PostgresTypeMapper {
    /// `format_type` style name of a built-in type, if known.
    pub fn builtin_type_name(type_oid: u32) -> Option<&'static str> {
        let name = match type_oid {
            // Boolean
            16 => "boolean",

            // Binary
            17 => "bytea",

            // Integer types
            20 => "bigint",
            21 => "smallint",
            23 => "integer",
            26 => "oid",
            28 => "xid",

            // Floating point
            700 => "real",
            701 => "double precision",

            // Numeric/Decimal
            1700 => "numeric",
            790 => "money",

            // String types
            18 => "\"char\"",
            19 => "name",
            25 => "text",
            1042 => "character",
            1043 => "character varying",

            // Bit strings
            1560 => "bit",
            1562 => "bit varying",

            // Date/Time types
            1082 => "date",
            1083 => "time without time zone",
            1266 => "time with time zone",
            1114 => "timestamp without time zone",
            1184 => "timestamp with time zone",
            1186 => "interval",

            // JSON types
            114 => "json",
            3802 => "jsonb",

            // UUID
            2950 => "uuid",

            // Network types
            869 => "inet",
            650 => "cidr",
            829 => "macaddr",

            // Geometric types
            600 => "point",
            601 => "lseg",
            602 => "path",
            603 => "box",
            604 => "polygon",
            628 => "line",
            718 => "circle",

            // Common arrays
            1000 => "boolean[]",
            1005 => "smallint[]",
            1007 => "integer[]",
            1016 => "bigint[]",
            1009 => "text[]",
            1015 => "character varying[]",

            _ => return None,
        };
        Some(name)
    }

    /// Literal category of values of the type.
    pub fn type_category(type_oid: u32) -> TypeCategory {
        TypeCategory::from_type_oid(type_oid)
    }

    /// Fallback display name for a type that is neither built in nor
    /// announced by a TYPE message.
    pub fn unknown_type_name(type_oid: u32) -> String {
        format!("oid:{}", type_oid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names() {
        assert_eq!(PostgresTypeMapper::builtin_type_name(23), Some("integer"));
        assert_eq!(PostgresTypeMapper::builtin_type_name(25), Some("text"));
        assert_eq!(
            PostgresTypeMapper::builtin_type_name(1043),
            Some("character varying")
        );
        assert_eq!(
            PostgresTypeMapper::builtin_type_name(1184),
            Some("timestamp with time zone")
        );
        assert_eq!(PostgresTypeMapper::builtin_type_name(16384), None);
    }

    #[test]
    fn test_categories() {
        assert_eq!(PostgresTypeMapper::type_category(20), TypeCategory::Numeric);
        assert_eq!(PostgresTypeMapper::type_category(1562), TypeCategory::BitString);
        assert_eq!(PostgresTypeMapper::type_category(16), TypeCategory::Boolean);
        // money prints with a currency symbol, so it is quoted
        assert_eq!(PostgresTypeMapper::type_category(790), TypeCategory::Other);
    }

    #[test]
    fn test_unknown_type_name() {
        assert_eq!(PostgresTypeMapper::unknown_type_name(16999), "oid:16999");
    }
}
