//! Text form of rule trees.

use std::fmt;

use crate::tree::{Rule, RuleKey, RuleTree};

impl RuleTree {
    fn write_node(&self, f: &mut fmt::Formatter<'_>, key: RuleKey) -> fmt::Result {
        let Some(rule) = self.rule(key) else {
            return Ok(());
        };
        match rule {
            Rule::Intersection(a, b) => {
                self.write_operand(f, *a, rule)?;
                f.write_str(" ")?;
                self.write_operand(f, *b, rule)
            }
            Rule::Union(a, b) => {
                self.write_operand(f, *a, rule)?;
                f.write_str(" : ")?;
                self.write_operand(f, *b, rule)
            }
            Rule::Surface(leaf) => write!(f, "{}", leaf.signed_id()),
            Rule::ObjectComplement(n) => write!(f, "#{n}"),
            Rule::GroupComplement(c) => {
                f.write_str("#(")?;
                self.write_node(f, *c)?;
                f.write_str(")")
            }
            Rule::Constant(v) => write!(f, "{v}"),
        }
    }

    /// An operand is bracketed only when it is the other binary operator.
    fn write_operand(&self, f: &mut fmt::Formatter<'_>, key: RuleKey, parent: &Rule) -> fmt::Result {
        let bracket = matches!(
            (parent, self.rule(key)),
            (Rule::Intersection(..), Some(Rule::Union(..))) | (Rule::Union(..), Some(Rule::Intersection(..)))
        );
        if bracket {
            f.write_str("(")?;
            self.write_node(f, key)?;
            f.write_str(")")
        } else {
            self.write_node(f, key)
        }
    }
}

impl fmt::Display for RuleTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root() {
            Some(root) => self.write_node(f, root),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::tree::{Rule, RuleTree};

    #[test]
    fn test_display_round_trip() {
        for text in [
            "1 -2 3 -4 5 -6",
            "-1 : 2",
            "(1 : 2) -3",
            "1 (2 : -3) #(4 5) #17",
            "#((1 : 2) 3) : 4",
        ] {
            let tree = RuleTree::parse(text).unwrap();
            assert_eq!(tree.to_string(), text);
            let again = RuleTree::parse(&tree.to_string()).unwrap();
            assert_eq!(again.to_string(), text);
        }
    }

    #[test]
    fn test_display_normalises_spacing() {
        let tree = RuleTree::parse("  1   :2(3 4)").unwrap();
        // Left-to-right reduction: (1 : 2) (3 4)
        assert_eq!(tree.to_string(), "(1 : 2) 3 4");
    }

    #[test]
    fn test_display_constants_and_empty() {
        assert_eq!(RuleTree::new().to_string(), "");
        assert_eq!(RuleTree::single(Rule::Constant(false)).to_string(), "false");
    }
}
