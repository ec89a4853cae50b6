use crate::filter::{Operator, Token, Where};
use valuehelp_schema::types::Literal;

///
/// Find the literal bound to `field` by an equality comparison anywhere in
/// a filter.
///
/// The scan is depth-first and left to right; the first `field = <literal>`
/// triple wins. Later, possibly contradictory, bindings are never looked at.
///
/// NOTE: `and` and `or` are treated alike. A binding found inside one
/// disjunct is returned as if it held for the whole filter. Value-list
/// consumers rely on this leniency, so it is kept on purpose.
///
#[must_use]
pub fn constant_in_where<'a>(filter: Option<&'a Where>, field: &str) -> Option<&'a Literal> {
    find_constant(filter?.tokens(), field)
}

fn find_constant<'a>(tokens: &'a [Token], field: &str) -> Option<&'a Literal> {
    for (i, current) in tokens.iter().enumerate() {
        if let [Token::Ref(lhs), Token::Op(Operator::Eq), Token::Val(value), ..] = &tokens[i..]
            && lhs.head() == Some(field)
        {
            return Some(value);
        }

        match current {
            // parenthesized group
            Token::Group(inner) => {
                if let Some(found) = find_constant(inner, field) {
                    return Some(found);
                }
            }

            // unknown object shape: search whatever sequences it holds
            Token::Node(entries) => {
                for (_, value) in entries {
                    if let Token::Group(inner) = value
                        && let Some(found) = find_constant(inner, field)
                    {
                        return Some(found);
                    }
                }
            }

            // leaves and operators; `and` / `or` carry no meaning here
            Token::Ref(_) | Token::Val(_) | Token::Op(_) | Token::Bare(_) => {}
        }
    }

    None
}
