// Packet tree types

use num_bigint::BigUint;
use serde::{Serialize, Serializer};
use std::fmt;

/// Type ID reserved for literal value packets
pub const LITERAL_TYPE_ID: u8 = 4;

/// Operator kinds, keyed by their 3-bit type ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Sum,
    Product,
    Minimum,
    Maximum,
    GreaterThan,
    LessThan,
    EqualTo,
}

impl Operator {
    /// Map a type ID to its operator; `None` for the literal type ID and
    /// anything wider than 3 bits
    pub fn from_type_id(type_id: u8) -> Option<Self> {
        match type_id {
            0 => Some(Operator::Sum),
            1 => Some(Operator::Product),
            2 => Some(Operator::Minimum),
            3 => Some(Operator::Maximum),
            5 => Some(Operator::GreaterThan),
            6 => Some(Operator::LessThan),
            7 => Some(Operator::EqualTo),
            _ => None,
        }
    }

    pub fn type_id(&self) -> u8 {
        match self {
            Operator::Sum => 0,
            Operator::Product => 1,
            Operator::Minimum => 2,
            Operator::Maximum => 3,
            Operator::GreaterThan => 5,
            Operator::LessThan => 6,
            Operator::EqualTo => 7,
        }
    }

    /// Comparison operators take exactly two operands
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::GreaterThan | Operator::LessThan | Operator::EqualTo
        )
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Sum => "+",
            Operator::Product => "*",
            Operator::Minimum => "min",
            Operator::Maximum => "max",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::EqualTo => "==",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// How an operator frames its sub-packets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthType {
    /// Length type ID 0: a 15-bit count of bits occupied by the sub-packets
    TotalLength,
    /// Length type ID 1: an 11-bit count of immediate sub-packets
    Count,
}

impl LengthType {
    /// Width of the length field that follows the length type ID
    pub fn field_width(&self) -> usize {
        match self {
            LengthType::TotalLength => 15,
            LengthType::Count => 11,
        }
    }

    pub fn from_flag(flag: bool) -> Self {
        if flag {
            LengthType::Count
        } else {
            LengthType::TotalLength
        }
    }

    pub fn flag(&self) -> bool {
        matches!(self, LengthType::Count)
    }
}

/// A decoded packet: either a literal value or an operator over sub-packets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Packet {
    Literal {
        version: u8,
        #[serde(serialize_with = "serialize_decimal")]
        value: BigUint,
    },
    Operator {
        version: u8,
        operator: Operator,
        framing: LengthType,
        children: Vec<Packet>,
    },
}

fn serialize_decimal<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

impl Packet {
    pub fn literal(version: u8, value: impl Into<BigUint>) -> Self {
        Packet::Literal {
            version,
            value: value.into(),
        }
    }

    pub fn operator(
        version: u8,
        operator: Operator,
        framing: LengthType,
        children: Vec<Packet>,
    ) -> Self {
        Packet::Operator {
            version,
            operator,
            framing,
            children,
        }
    }

    pub fn version(&self) -> u8 {
        match self {
            Packet::Literal { version, .. } | Packet::Operator { version, .. } => *version,
        }
    }

    pub fn type_id(&self) -> u8 {
        match self {
            Packet::Literal { .. } => LITERAL_TYPE_ID,
            Packet::Operator { operator, .. } => operator.type_id(),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Packet::Literal { .. })
    }

    /// Literal value, if this is a literal packet
    pub fn value(&self) -> Option<&BigUint> {
        match self {
            Packet::Literal { value, .. } => Some(value),
            Packet::Operator { .. } => None,
        }
    }

    /// Sub-packets; empty for literals
    pub fn children(&self) -> &[Packet] {
        match self {
            Packet::Literal { .. } => &[],
            Packet::Operator { children, .. } => children,
        }
    }

    /// Number of packet levels in the tree; 1 for a lone literal
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((packet, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            pending.extend(packet.children().iter().map(|child| (child, depth + 1)));
        }
        deepest
    }
}

/// Children are torn down from a work list so dropping a deep tree does not
/// recurse
impl Drop for Packet {
    fn drop(&mut self) {
        let Packet::Operator { children, .. } = self else {
            return;
        };
        let mut pending = std::mem::take(children);
        while let Some(mut packet) = pending.pop() {
            if let Packet::Operator { children, .. } = &mut packet {
                pending.append(children);
            }
        }
    }
}

enum Token<'a> {
    Packet(&'a Packet),
    Close,
}

/// Prefix expression form, e.g. `(+ 1 (* 2 3))`
impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tokens = vec![Token::Packet(self)];
        let mut first = true;

        while let Some(token) = tokens.pop() {
            let Token::Packet(packet) = token else {
                f.write_str(")")?;
                continue;
            };
            if !first {
                f.write_str(" ")?;
            }
            first = false;

            match packet {
                Packet::Literal { value, .. } => write!(f, "{}", value)?,
                Packet::Operator {
                    operator, children, ..
                } => {
                    write!(f, "({}", operator.symbol())?;
                    tokens.push(Token::Close);
                    tokens.extend(children.iter().rev().map(Token::Packet));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_type_ids() {
        for type_id in 0u8..8 {
            match Operator::from_type_id(type_id) {
                Some(op) => assert_eq!(op.type_id(), type_id),
                None => assert_eq!(type_id, LITERAL_TYPE_ID),
            }
        }
        assert_eq!(Operator::from_type_id(8), None);
        assert_eq!(Operator::from_type_id(6), Some(Operator::LessThan));
    }

    #[test]
    fn test_comparison_kinds() {
        assert!(Operator::GreaterThan.is_comparison());
        assert!(Operator::EqualTo.is_comparison());
        assert!(!Operator::Sum.is_comparison());
        assert!(!Operator::Maximum.is_comparison());
    }

    #[test]
    fn test_length_type() {
        assert_eq!(LengthType::from_flag(false), LengthType::TotalLength);
        assert_eq!(LengthType::from_flag(true), LengthType::Count);
        assert_eq!(LengthType::TotalLength.field_width(), 15);
        assert_eq!(LengthType::Count.field_width(), 11);
        assert!(LengthType::Count.flag());
    }

    #[test]
    fn test_packet_accessors() {
        let lit = Packet::literal(6, 2021u32);
        assert!(lit.is_literal());
        assert_eq!(lit.version(), 6);
        assert_eq!(lit.type_id(), 4);
        assert_eq!(lit.value(), Some(&BigUint::from(2021u32)));
        assert!(lit.children().is_empty());

        let op = Packet::operator(1, Operator::LessThan, LengthType::TotalLength, vec![lit]);
        assert!(!op.is_literal());
        assert_eq!(op.type_id(), 6);
        assert_eq!(op.value(), None);
        assert_eq!(op.children().len(), 1);
    }

    #[test]
    fn test_display_expression() {
        let packet = Packet::operator(
            0,
            Operator::Sum,
            LengthType::Count,
            vec![
                Packet::literal(0, 1u32),
                Packet::operator(
                    0,
                    Operator::EqualTo,
                    LengthType::TotalLength,
                    vec![Packet::literal(0, 2u32), Packet::literal(0, 3u32)],
                ),
            ],
        );
        assert_eq!(packet.to_string(), "(+ 1 (== 2 3))");
    }

    #[test]
    fn test_operator_display() {
        assert_eq!(Operator::GreaterThan.to_string(), "GreaterThan");
        assert_eq!(Operator::Sum.to_string(), "Sum");
    }

    #[test]
    fn test_depth() {
        assert_eq!(Packet::literal(0, 1u32).depth(), 1);

        let packet = Packet::operator(
            0,
            Operator::Sum,
            LengthType::Count,
            vec![
                Packet::literal(0, 1u32),
                Packet::operator(
                    0,
                    Operator::Product,
                    LengthType::Count,
                    vec![Packet::literal(0, 2u32)],
                ),
            ],
        );
        assert_eq!(packet.depth(), 3);
    }

    #[test]
    fn test_deep_tree_display_and_drop() {
        let levels = 100_000;
        let mut packet = Packet::literal(0, 7u32);
        for _ in 0..levels {
            packet = Packet::operator(0, Operator::Minimum, LengthType::Count, vec![packet]);
        }
        assert_eq!(packet.depth(), levels + 1);

        let text = packet.to_string();
        assert!(text.starts_with("(min (min "));
        assert!(text.ends_with(" 7))"));
        assert_eq!(text.matches('(').count(), levels);
        drop(packet);
    }

    #[test]
    fn test_serialize_json() {
        let packet = Packet::operator(
            7,
            Operator::Maximum,
            LengthType::Count,
            vec![Packet::literal(2, u128::MAX)],
        );
        let json = serde_json::to_value(&packet).unwrap();

        assert_eq!(json["kind"], "operator");
        assert_eq!(json["operator"], "maximum");
        assert_eq!(json["framing"], "count");
        assert_eq!(json["children"][0]["kind"], "literal");
        assert_eq!(
            json["children"][0]["value"],
            "340282366920938463463374607431768211455"
        );
    }
}
