//! Operator precedence and parenthesisation.

use crate::ir::{Expr, NodeKind};

/// Precedence of anything that never needs grouping.
pub const PRIMARY: u8 = 100;

/// Precedence class of a node tag. Lower binds looser.
pub fn precedence(kind: NodeKind) -> u8 {
    use NodeKind::*;
    match kind {
        Assign | AddAssign | AddAssignChecked | SubtractAssign | SubtractAssignChecked
        | MultiplyAssign | MultiplyAssignChecked | DivideAssign | ModuloAssign | PowerAssign
        | AndAssign | OrAssign | ExclusiveOrAssign | LeftShiftAssign | RightShiftAssign | Quote
        | Extension => 1,
        Coalesce | Conditional => 2,
        OrElse => 3,
        AndAlso => 4,
        Or => 5,
        ExclusiveOr => 6,
        And => 7,
        Equal | NotEqual | TypeEqual => 8,
        LessThan | LessThanOrEqual | GreaterThan | GreaterThanOrEqual | TypeAs | TypeIs => 9,
        LeftShift | RightShift => 10,
        Add | AddChecked | Subtract | SubtractChecked | Increment | Decrement => 11,
        Multiply | MultiplyChecked | Divide | Modulo => 12,
        Convert | ConvertChecked | IsFalse | Negate | NegateChecked | Not | OnesComplement
        | PreIncrementAssign | PreDecrementAssign | UnaryPlus | Unbox => 13,
        Power => 14,
        _ => PRIMARY,
    }
}

/// Precedence of a concrete node. A negative numeric literal renders with a
/// leading minus and binds like a unary operator.
pub fn precedence_of(expr: &Expr) -> u8 {
    match expr {
        Expr::Constant(constant) if constant.value.is_negative() => precedence(NodeKind::Negate),
        other => precedence(other.kind()),
    }
}

/// Whether `child` must be parenthesised as an operand of a `parent` node.
pub fn should_group(child: Option<&Expr>, parent: NodeKind, is_right: bool) -> bool {
    let Some(child) = child else {
        return false;
    };
    let child_precedence = precedence_of(child);
    let parent_precedence = precedence(parent);
    if child_precedence != parent_precedence {
        return child_precedence < parent_precedence;
    }
    use NodeKind::*;
    match parent {
        Conditional | Equal | NotEqual | Negate | NegateChecked | UnaryPlus => true,
        Divide | Modulo | LeftShift | RightShift | Power | Subtract | SubtractChecked => is_right,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Parameter, Type};

    fn var(name: &str) -> Expr {
        Parameter::new(Type::Int, name).into()
    }

    #[test]
    fn looser_children_group() {
        let sum = Expr::add(var("a"), var("b"));
        assert!(should_group(Some(&sum), NodeKind::Multiply, false));
        let product = Expr::multiply(var("a"), var("b"));
        assert!(!should_group(Some(&product), NodeKind::Add, true));
    }

    #[test]
    fn right_operand_of_non_associative_operators_groups() {
        let difference = Expr::subtract(var("b"), var("c"));
        assert!(should_group(Some(&difference), NodeKind::Subtract, true));
        assert!(!should_group(Some(&difference), NodeKind::Subtract, false));
        let sum = Expr::add(var("b"), var("c"));
        assert!(!should_group(Some(&sum), NodeKind::Add, true));
    }

    #[test]
    fn equality_and_conditionals_always_group_peers() {
        let eq = Expr::equal(var("a"), var("b"));
        assert!(should_group(Some(&eq), NodeKind::Equal, false));
        let ternary = Expr::ternary(
            Expr::greater_than(var("a"), var("b")),
            var("a"),
            var("b"),
        );
        assert!(should_group(Some(&ternary), NodeKind::Conditional, false));
    }

    #[test]
    fn negative_literals_bind_as_unary() {
        let minus_one = Expr::constant(-1);
        assert_eq!(precedence_of(&minus_one), 13);
        assert!(should_group(Some(&minus_one), NodeKind::Negate, false));
        assert!(!should_group(Some(&minus_one), NodeKind::Add, true));
        assert!(should_group(Some(&minus_one), NodeKind::Power, false));
    }

    #[test]
    fn absent_child_never_groups() {
        assert!(!should_group(None, NodeKind::Throw, false));
    }
}
