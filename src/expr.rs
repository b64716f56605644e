//! Combination of selection labels.
//!
//! Every [`crate::EntrySet`] carries an opaque label naming the condition
//! that produced it. When two sets are combined, the resulting label is the
//! boolean combination of the operands' labels. The set itself never parses
//! or evaluates labels; it only asks a [`CombineExpr`] to fold two of them
//! together, so the surrounding system is free to use whatever selection
//! expression language it likes.

/// Boolean operator applied to a pair of selection labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    /// Union of the two selections.
    Or,
    /// Intersection of the two selections.
    And,
    /// The left selection excluding the right.
    AndNot,
}

/// Strategy for folding two opaque selection labels into one.
pub trait CombineExpr {
    /// Combine `lhs` and `rhs` under `op`, returning the new label.
    fn combine(&self, lhs: &str, rhs: &str, op: BoolOp) -> String;
}

/// The default combiner. Produces cut-style textual expressions with each
/// side parenthesised, so nested combinations stay unambiguous. An empty
/// side drops out of the expression rather than producing `()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CutExpr;

impl CombineExpr for CutExpr {
    fn combine(&self, lhs: &str, rhs: &str, op: BoolOp) -> String {
        if rhs.is_empty() {
            return lhs.to_string();
        }
        if lhs.is_empty() {
            return match op {
                BoolOp::Or | BoolOp::And => rhs.to_string(),
                BoolOp::AndNot => format!("!({})", rhs),
            };
        }
        match op {
            BoolOp::Or => format!("({})||({})", lhs, rhs),
            BoolOp::And => format!("({})&&({})", lhs, rhs),
            BoolOp::AndNot => format!("({})&&!({})", lhs, rhs),
        }
    }
}

/// A combiner that keeps the left label untouched, for callers that do not
/// track selection provenance.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullExpr;

impl CombineExpr for NullExpr {
    fn combine(&self, lhs: &str, _rhs: &str, _op: BoolOp) -> String {
        lhs.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{BoolOp, CombineExpr, CutExpr, NullExpr};

    #[test]
    fn test_cut_combine() {
        assert_eq!(CutExpr.combine("a", "b", BoolOp::Or), "(a)||(b)");
        assert_eq!(CutExpr.combine("a", "b", BoolOp::And), "(a)&&(b)");
        assert_eq!(CutExpr.combine("a", "b", BoolOp::AndNot), "(a)&&!(b)");
    }

    #[test]
    fn test_cut_combine_empty_sides() {
        assert_eq!(CutExpr.combine("a", "", BoolOp::Or), "a");
        assert_eq!(CutExpr.combine("a", "", BoolOp::AndNot), "a");
        assert_eq!(CutExpr.combine("", "b", BoolOp::Or), "b");
        assert_eq!(CutExpr.combine("", "b", BoolOp::And), "b");
        assert_eq!(CutExpr.combine("", "b", BoolOp::AndNot), "!(b)");
        assert_eq!(CutExpr.combine("", "", BoolOp::Or), "");
    }

    #[test]
    fn test_cut_combine_nested() {
        let u = CutExpr.combine("x<0", "y>0", BoolOp::Or);
        let n = CutExpr.combine(&u, "z==1", BoolOp::And);
        assert_eq!(n, "((x<0)||(y>0))&&(z==1)");
    }

    #[test]
    fn test_null_combine() {
        assert_eq!(NullExpr.combine("a", "b", BoolOp::Or), "a");
        assert_eq!(NullExpr.combine("", "b", BoolOp::AndNot), "");
    }
}
