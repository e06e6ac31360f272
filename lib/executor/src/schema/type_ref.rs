use std::{fmt, str::FromStr};

/// Unresolved type reference as written in a schema: `[Item!]!`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeRefParseError {
    #[error("Type reference is empty")]
    Empty,
    #[error("'{0}' is not a valid type name")]
    InvalidName(String),
    #[error("Type reference '{0}' wraps a non-null type in another non-null")]
    NestedNonNull(String),
    #[error("Type reference '{0}' has unbalanced list brackets")]
    UnbalancedList(String),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    pub fn non_null(inner: TypeRef) -> Self {
        TypeRef::NonNull(Box::new(inner))
    }

    pub fn parse(input: &str) -> Result<Self, TypeRefParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(TypeRefParseError::Empty);
        }

        if let Some(inner) = input.strip_suffix('!') {
            let inner = inner.trim_end();
            if inner.ends_with('!') {
                return Err(TypeRefParseError::NestedNonNull(input.to_string()));
            }
            return Ok(TypeRef::non_null(TypeRef::parse(inner)?));
        }

        if let Some(rest) = input.strip_prefix('[') {
            return match rest.strip_suffix(']') {
                Some(inner) => Ok(TypeRef::list(TypeRef::parse(inner)?)),
                None => Err(TypeRefParseError::UnbalancedList(input.to_string())),
            };
        }

        if input.ends_with(']') {
            return Err(TypeRefParseError::UnbalancedList(input.to_string()));
        }

        if is_valid_name(input) {
            Ok(TypeRef::Named(input.to_string()))
        } else {
            Err(TypeRefParseError::InvalidName(input.to_string()))
        }
    }

    /// Innermost named type, with every list and non-null layer stripped.
    pub fn named_type(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.named_type(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

impl FromStr for TypeRef {
    type Err = TypeRefParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeRef::parse(s)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_wrappers() {
        let parsed = TypeRef::parse("[Item!]!").unwrap();
        assert_eq!(
            parsed,
            TypeRef::non_null(TypeRef::list(TypeRef::non_null(TypeRef::named("Item"))))
        );
        assert_eq!(parsed.named_type(), "Item");
        assert_eq!(parsed.to_string(), "[Item!]!");
    }

    #[test]
    fn tolerates_whitespace() {
        assert_eq!(
            TypeRef::parse(" [ String ] ").unwrap().to_string(),
            "[String]"
        );
    }

    #[test]
    fn rejects_malformed_references() {
        assert_eq!(TypeRef::parse(""), Err(TypeRefParseError::Empty));
        assert_eq!(
            TypeRef::parse("String!!"),
            Err(TypeRefParseError::NestedNonNull("String!!".to_string()))
        );
        assert_eq!(
            TypeRef::parse("[String"),
            Err(TypeRefParseError::UnbalancedList("[String".to_string()))
        );
        assert_eq!(
            TypeRef::parse("String]"),
            Err(TypeRefParseError::UnbalancedList("String]".to_string()))
        );
        assert_eq!(
            TypeRef::parse("1Thing"),
            Err(TypeRefParseError::InvalidName("1Thing".to_string()))
        );
    }
}
