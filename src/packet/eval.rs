// Expression evaluation over a decoded packet tree

use super::error::{PacketError, Result};
use super::types::{Operator, Packet};
use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Steps of the post-order walk
enum Step<'a> {
    Visit(&'a Packet),
    Apply { operator: Operator, operands: usize },
}

/// Evaluate a packet as an arithmetic/logic expression.
///
/// Comparisons yield 1 or 0. Operators with no operands, and comparisons
/// with anything other than two, are rejected rather than defaulted. The
/// tree is walked with an explicit stack, so any nesting depth is safe.
pub fn evaluate(packet: &Packet) -> Result<BigUint> {
    let mut steps = vec![Step::Visit(packet)];
    let mut values: Vec<BigUint> = Vec::new();

    while let Some(step) = steps.pop() {
        match step {
            Step::Visit(Packet::Literal { value, .. }) => values.push(value.clone()),
            Step::Visit(Packet::Operator {
                operator, children, ..
            }) => {
                check_operands(*operator, children.len())?;
                steps.push(Step::Apply {
                    operator: *operator,
                    operands: children.len(),
                });
                // Reversed so the first child is evaluated first
                steps.extend(children.iter().rev().map(Step::Visit));
            }
            Step::Apply { operator, operands } => {
                let args = values.split_off(values.len() - operands);
                values.push(apply(operator, args));
            }
        }
    }

    debug_assert_eq!(values.len(), 1);
    Ok(values.pop().unwrap_or_default())
}

fn check_operands(operator: Operator, found: usize) -> Result<()> {
    if operator.is_comparison() && found != 2 {
        return Err(PacketError::Arity { operator, found });
    }
    if found == 0 {
        return Err(PacketError::NoOperands { operator });
    }
    Ok(())
}

/// Combine operand values already checked by `check_operands`
fn apply(operator: Operator, args: Vec<BigUint>) -> BigUint {
    let holds = match operator {
        Operator::GreaterThan => args[0] > args[1],
        Operator::LessThan => args[0] < args[1],
        Operator::EqualTo => args[0] == args[1],
        _ => {
            return args
                .into_iter()
                .reduce(|acc, next| match operator {
                    Operator::Sum => acc + next,
                    Operator::Product => acc * next,
                    Operator::Minimum => acc.min(next),
                    _ => acc.max(next),
                })
                .unwrap_or_default();
        }
    };

    if holds {
        BigUint::one()
    } else {
        BigUint::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::error::ErrorCategory;
    use crate::packet::parser::decode;
    use crate::packet::types::LengthType;

    fn eval_hex(hex: &str) -> BigUint {
        evaluate(&decode(hex).unwrap()).unwrap()
    }

    fn op(operator: Operator, children: Vec<Packet>) -> Packet {
        Packet::operator(0, operator, LengthType::Count, children)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval_hex("C200B40A82"), BigUint::from(3u32));
        assert_eq!(eval_hex("04005AC33890"), BigUint::from(54u32));
        assert_eq!(eval_hex("880086C3E88112"), BigUint::from(7u32));
        assert_eq!(eval_hex("CE00C43D881120"), BigUint::from(9u32));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval_hex("D8005AC2A8F0"), BigUint::one());
        assert_eq!(eval_hex("F600BC2D8F"), BigUint::zero());
        assert_eq!(eval_hex("9C005AC2F8F0"), BigUint::zero());
        assert_eq!(eval_hex("9C0141080250320F1802104A08"), BigUint::one());
    }

    #[test]
    fn test_big_product() {
        // Two literals of 2^80 - 1 under a Product
        let value = eval_hex("060084FFFFFFFFFFFFFFFFFFFFFFFEF13FFFFFFFFFFFFFFFFFFFFFFFBC");
        let big = (BigUint::one() << 80u32) - 1u32;
        assert_eq!(value, &big * &big);
        assert_eq!(
            value.to_string(),
            "1461501637330902918203682414864643790397583130625"
        );
    }

    #[test]
    fn test_single_operand() {
        let packet = op(Operator::Minimum, vec![Packet::literal(0, 42u32)]);
        assert_eq!(evaluate(&packet).unwrap(), BigUint::from(42u32));
    }

    #[test]
    fn test_comparison_arity() {
        // GreaterThan over three literals decodes but cannot be evaluated
        let packet = decode("7600C40882106").unwrap();
        assert_eq!(packet.children().len(), 3);

        let err = evaluate(&packet).unwrap_err();
        assert_eq!(
            err,
            PacketError::Arity {
                operator: Operator::GreaterThan,
                found: 3
            }
        );
        assert_eq!(err.category(), ErrorCategory::Protocol);

        let packet = op(Operator::EqualTo, vec![Packet::literal(0, 1u32)]);
        assert!(matches!(
            evaluate(&packet),
            Err(PacketError::Arity { found: 1, .. })
        ));
    }

    #[test]
    fn test_no_operands() {
        let packet = op(Operator::Sum, vec![]);
        assert_eq!(
            evaluate(&packet).unwrap_err(),
            PacketError::NoOperands {
                operator: Operator::Sum
            }
        );

        // Nested failures abort the whole evaluation
        let packet = op(
            Operator::Product,
            vec![Packet::literal(0, 2u32), op(Operator::Maximum, vec![])],
        );
        assert!(evaluate(&packet).is_err());
    }

    #[test]
    fn test_deep_tree() {
        let mut packet = Packet::literal(0, 5u32);
        for _ in 0..200_000 {
            packet = op(Operator::Maximum, vec![packet]);
        }
        let packet = op(Operator::Sum, vec![packet, Packet::literal(0, 1u32)]);
        assert_eq!(evaluate(&packet).unwrap(), BigUint::from(6u32));
    }

    #[test]
    fn test_operand_order() {
        // 2 > 9 is false, 9 > 2 is true
        let lhs_small = op(
            Operator::GreaterThan,
            vec![Packet::literal(0, 2u32), Packet::literal(0, 9u32)],
        );
        let lhs_big = op(
            Operator::GreaterThan,
            vec![Packet::literal(0, 9u32), Packet::literal(0, 2u32)],
        );
        assert_eq!(evaluate(&lhs_small).unwrap(), BigUint::zero());
        assert_eq!(evaluate(&lhs_big).unwrap(), BigUint::one());
    }

    #[test]
    fn test_evaluate_is_pure() {
        let packet = decode("9C0141080250320F1802104A08").unwrap();
        let before = packet.clone();
        assert_eq!(evaluate(&packet).unwrap(), evaluate(&packet).unwrap());
        assert_eq!(packet, before);
    }
}
