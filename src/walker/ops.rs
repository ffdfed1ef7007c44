use std::cmp::Ordering;
use crate::parse::BinaryOp;
use super::{
    env::Environment,
    heap::HeapRef,
    value::Value,
    ExecError,
};

/// Apply a binary operator to two heap values, allocating the result.
pub fn apply(env: &mut Environment, op: BinaryOp, lhs: HeapRef, rhs: HeapRef) -> Result<HeapRef, ExecError> {
    let (a, b) = (env.get(lhs)?, env.get(rhs)?);
    if a.ty() != b.ty() {
        return Err(ExecError::TypeMismatch { op, lhs: a.ty(), rhs: b.ty() });
    }
    if !a.supports(op) {
        return Err(ExecError::UnsupportedOperator { op, ty: a.ty() });
    }

    let result = match op {
        BinaryOp::EqEq => Value::Bool(lhs == rhs),
        BinaryOp::Eq => Value::Bool(equals(env, lhs, rhs)?),
        BinaryOp::NotEq => Value::Bool(!equals(env, lhs, rhs)?),
        BinaryOp::Greater => Value::Bool(compare(env, op, lhs, rhs)? == Ordering::Greater),
        BinaryOp::Less => Value::Bool(compare(env, op, lhs, rhs)? == Ordering::Less),
        BinaryOp::GreaterEq => Value::Bool(compare(env, op, lhs, rhs)? != Ordering::Less),
        BinaryOp::LessEq => Value::Bool(compare(env, op, lhs, rhs)? != Ordering::Greater),
        _ => arithmetic(op, a, b)?,
    };
    env.alloc(result)
}

fn arithmetic(op: BinaryOp, a: &Value, b: &Value) -> Result<Value, ExecError> {
    Ok(match (a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(match op {
            BinaryOp::Add => x.wrapping_add(*y),
            BinaryOp::Sub => x.wrapping_sub(*y),
            BinaryOp::Mul => x.wrapping_mul(*y),
            BinaryOp::Div if *y == 0 => return Err(ExecError::DivisionByZero),
            BinaryOp::Div => x.wrapping_div(*y),
            BinaryOp::Rem if *y == 0 => return Err(ExecError::ModuloByZero),
            BinaryOp::Rem => x.wrapping_rem(*y),
            _ => return Err(ExecError::UnsupportedOperator { op, ty: a.ty() }),
        }),
        (Value::Bool(x), Value::Bool(y)) => Value::Bool(match op {
            BinaryOp::And => *x && *y,
            BinaryOp::Or => *x || *y,
            _ => return Err(ExecError::UnsupportedOperator { op, ty: a.ty() }),
        }),
        // Concatenation shares the element handles of both operands.
        (Value::List(xs), Value::List(ys)) if op == BinaryOp::Add => {
            Value::List(xs.iter().chain(ys).copied().collect())
        },
        _ => return Err(ExecError::UnsupportedOperator { op, ty: a.ty() }),
    })
}

/// Pairs of lists whose comparison is already under way further up the stack. Meeting one
/// again means the lists are cyclic, and the pair is taken as equal.
type Visiting = Vec<(HeapRef, HeapRef)>;

/// Structural equality. Values of different types are never equal.
pub fn equals(env: &Environment, a: HeapRef, b: HeapRef) -> Result<bool, ExecError> {
    equals_in(env, a, b, &mut Vec::new())
}

fn equals_in(env: &Environment, a: HeapRef, b: HeapRef, visiting: &mut Visiting) -> Result<bool, ExecError> {
    if a == b || visiting.contains(&(a, b)) {
        return Ok(true);
    }
    Ok(match (env.get(a)?, env.get(b)?) {
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Char(x), Value::Char(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::List(xs), Value::List(ys)) => {
            if xs.len() != ys.len() {
                return Ok(false);
            }
            visiting.push((a, b));
            let mut same = true;
            for (x, y) in xs.iter().zip(ys) {
                if !equals_in(env, *x, *y, visiting)? {
                    same = false;
                    break;
                }
            }
            visiting.pop();
            same
        },
        _ => false,
    })
}

/// Ordering for the relational operators. Lists compare lexicographically; a strict prefix
/// orders first.
pub fn compare(env: &Environment, op: BinaryOp, a: HeapRef, b: HeapRef) -> Result<Ordering, ExecError> {
    compare_in(env, op, a, b, &mut Vec::new())
}

fn compare_in(
    env: &Environment,
    op: BinaryOp,
    a: HeapRef,
    b: HeapRef,
    visiting: &mut Visiting,
) -> Result<Ordering, ExecError> {
    match (env.get(a)?, env.get(b)?) {
        (Value::Char(x), Value::Char(y)) => Ok(x.cmp(y)),
        (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
        (Value::List(_), Value::List(_)) if a == b || visiting.contains(&(a, b)) => Ok(Ordering::Equal),
        (Value::List(xs), Value::List(ys)) => {
            visiting.push((a, b));
            let mut ordering = xs.len().cmp(&ys.len());
            for (x, y) in xs.iter().zip(ys) {
                if !equals_in(env, *x, *y, visiting)? {
                    ordering = compare_in(env, op, *x, *y, visiting)?;
                    break;
                }
            }
            visiting.pop();
            Ok(ordering)
        },
        (x, y) if x.ty() != y.ty() => Err(ExecError::TypeMismatch { op, lhs: x.ty(), rhs: y.ty() }),
        (x, _) => Err(ExecError::UnsupportedOperator { op, ty: x.ty() }),
    }
}

/// Printed form of a value, byte for byte. A list nested inside itself renders as `[...]`.
pub fn render_bytes(env: &Environment, r: HeapRef) -> Result<Vec<u8>, ExecError> {
    fn render_into(env: &Environment, r: HeapRef, out: &mut Vec<u8>, open: &mut Vec<HeapRef>) -> Result<(), ExecError> {
        match env.get(r)? {
            Value::Bool(true) => out.extend_from_slice(b"True"),
            Value::Bool(false) => out.extend_from_slice(b"False"),
            Value::Char(c) => out.extend_from_slice(&[b'\'', *c, b'\'']),
            Value::Int(x) => out.extend_from_slice(x.to_string().as_bytes()),
            Value::List(_) if open.contains(&r) => out.extend_from_slice(b"[...]"),
            Value::List(items) => {
                open.push(r);
                out.push(b'[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.extend_from_slice(b", ");
                    }
                    render_into(env, *item, out, open)?;
                }
                out.push(b']');
                open.pop();
            },
        }
        Ok(())
    }

    let mut out = Vec::new();
    render_into(env, r, &mut out, &mut Vec::new())?;
    Ok(out)
}

/// [`render_bytes`] as text. Chars outside ASCII that do not form valid UTF-8 are replaced.
pub fn render(env: &Environment, r: HeapRef) -> Result<String, ExecError> {
    Ok(String::from_utf8_lossy(&render_bytes(env, r)?).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::value::Type;

    fn string(env: &mut Environment, s: &str) -> HeapRef {
        let chars = s.bytes().map(|c| env.alloc_char(c).unwrap()).collect();
        env.alloc_list(chars).unwrap()
    }

    fn ints(env: &mut Environment, xs: &[i32]) -> HeapRef {
        let items = xs.iter().map(|x| env.alloc_int(*x).unwrap()).collect();
        env.alloc_list(items).unwrap()
    }

    fn truth(env: &mut Environment, op: BinaryOp, a: HeapRef, b: HeapRef) -> bool {
        let r = apply(env, op, a, b).unwrap();
        match env.get(r).unwrap() {
            Value::Bool(x) => *x,
            other => panic!("expected bool, got {:?}", other),
        }
    }

    #[test]
    fn int_arithmetic() {
        let mut env = Environment::default();
        let cases = [
            (BinaryOp::Add, 7, 3, 10),
            (BinaryOp::Sub, 7, 3, 4),
            (BinaryOp::Mul, 7, -3, -21),
            (BinaryOp::Div, 7, 2, 3),
            (BinaryOp::Div, -7, 2, -3),
            (BinaryOp::Rem, 7, 3, 1),
            (BinaryOp::Rem, -7, 3, -1),
            (BinaryOp::Add, i32::MAX, 1, i32::MIN),
        ];
        for (op, x, y, expected) in cases {
            let a = env.alloc_int(x).unwrap();
            let b = env.alloc_int(y).unwrap();
            let r = apply(&mut env, op, a, b).unwrap();
            assert_eq!(env.get(r).unwrap(), &Value::Int(expected), "{} {} {}", x, op, y);
        }
    }

    #[test]
    fn division_by_zero_fails() {
        let mut env = Environment::default();
        let a = env.alloc_int(1).unwrap();
        let zero = env.alloc_int(0).unwrap();
        assert!(matches!(apply(&mut env, BinaryOp::Div, a, zero), Err(ExecError::DivisionByZero)));
        assert!(matches!(apply(&mut env, BinaryOp::Rem, a, zero), Err(ExecError::ModuloByZero)));
    }

    #[test]
    fn operator_legality() {
        let mut env = Environment::default();
        let t = env.alloc_bool(true).unwrap();
        let c = env.alloc_char(b'a').unwrap();
        let one = env.alloc_int(1).unwrap();
        assert!(matches!(
            apply(&mut env, BinaryOp::Add, t, t),
            Err(ExecError::UnsupportedOperator { op: BinaryOp::Add, ty: Type::Bool })
        ));
        assert!(matches!(
            apply(&mut env, BinaryOp::Add, c, c),
            Err(ExecError::UnsupportedOperator { ty: Type::Char, .. })
        ));
        assert!(matches!(
            apply(&mut env, BinaryOp::And, one, one),
            Err(ExecError::UnsupportedOperator { ty: Type::Int, .. })
        ));
        assert!(matches!(
            apply(&mut env, BinaryOp::Eq, one, c),
            Err(ExecError::TypeMismatch { lhs: Type::Int, rhs: Type::Char, .. })
        ));
    }

    #[test]
    fn identity_versus_structure() {
        let mut env = Environment::default();
        let a1 = env.alloc_char(b'a').unwrap();
        let a2 = env.alloc_char(b'a').unwrap();
        assert!(!truth(&mut env, BinaryOp::EqEq, a1, a2));
        assert!(truth(&mut env, BinaryOp::EqEq, a1, a1));
        assert!(truth(&mut env, BinaryOp::Eq, a1, a2));

        let t = env.alloc_bool(true).unwrap();
        assert!(truth(&mut env, BinaryOp::EqEq, t, t));
    }

    #[test]
    fn list_equality_is_length_sensitive() {
        let mut env = Environment::default();
        let long = ints(&mut env, &[1, 2, 3]);
        let short = ints(&mut env, &[1, 2]);
        let short2 = ints(&mut env, &[1, 2]);
        assert!(!truth(&mut env, BinaryOp::Eq, long, short));
        assert!(truth(&mut env, BinaryOp::NotEq, long, short));
        assert!(truth(&mut env, BinaryOp::Eq, short, short2));
        assert!(!truth(&mut env, BinaryOp::EqEq, short, short2));
    }

    #[test]
    fn list_ordering_is_lexicographic() {
        let mut env = Environment::default();
        let dogs = string(&mut env, "Dogs");
        let fish = string(&mut env, "Fish");
        assert!(!truth(&mut env, BinaryOp::Greater, dogs, fish));
        assert!(truth(&mut env, BinaryOp::Less, dogs, fish));
        assert!(!truth(&mut env, BinaryOp::GreaterEq, dogs, fish));
        assert!(truth(&mut env, BinaryOp::LessEq, dogs, fish));
        assert!(!truth(&mut env, BinaryOp::Eq, dogs, fish));
        assert!(truth(&mut env, BinaryOp::NotEq, dogs, fish));

        let dog = string(&mut env, "Dog");
        assert!(truth(&mut env, BinaryOp::Less, dog, dogs));
        let dogs2 = string(&mut env, "Dogs");
        assert!(!truth(&mut env, BinaryOp::Greater, dogs, dogs2));
        assert!(!truth(&mut env, BinaryOp::Less, dogs, dogs2));
        assert!(truth(&mut env, BinaryOp::GreaterEq, dogs, dogs2));
    }

    #[test]
    fn ordering_mixed_lists() {
        let mut env = Environment::default();
        let c = env.alloc_char(b'x').unwrap();
        let i = env.alloc_int(1).unwrap();
        let chars = env.alloc_list(vec![c]).unwrap();
        let nums = env.alloc_list(vec![i]).unwrap();
        assert!(!truth(&mut env, BinaryOp::Eq, chars, nums));
        assert!(matches!(
            apply(&mut env, BinaryOp::Less, chars, nums),
            Err(ExecError::TypeMismatch { lhs: Type::Char, rhs: Type::Int, .. })
        ));
    }

    #[test]
    fn concatenation_shares_elements() {
        let mut env = Environment::default();
        let xs = ints(&mut env, &[1]);
        let ys = ints(&mut env, &[2, 3]);
        let zs = apply(&mut env, BinaryOp::Add, xs, ys).unwrap();
        let (xs_items, zs_items) = match (env.get(xs).unwrap(), env.get(zs).unwrap()) {
            (Value::List(a), Value::List(b)) => (a.clone(), b.clone()),
            _ => panic!("expected lists"),
        };
        assert_eq!(zs_items.len(), 3);
        assert_eq!(zs_items[0], xs_items[0]);
        assert_eq!(render(&env, zs).unwrap(), "[1, 2, 3]");
    }

    #[test]
    fn rendering() {
        let mut env = Environment::default();
        let t = env.alloc_bool(false).unwrap();
        assert_eq!(render(&env, t).unwrap(), "False");
        let s = string(&mut env, "hi");
        assert_eq!(render(&env, s).unwrap(), "['h', 'i']");
        let empty = env.alloc_list(Vec::new()).unwrap();
        assert_eq!(render(&env, empty).unwrap(), "[]");

        let me = env.alloc_list(Vec::new()).unwrap();
        if let Value::List(items) = env.get_mut(me).unwrap() {
            items.push(me);
        }
        assert_eq!(render(&env, me).unwrap(), "[[...]]");
    }

    fn self_containing(env: &mut Environment) -> HeapRef {
        let me = env.alloc_list(Vec::new()).unwrap();
        if let Value::List(items) = env.get_mut(me).unwrap() {
            items.push(me);
        }
        me
    }

    #[test]
    fn cyclic_lists_compare_without_recursing_forever() {
        let mut env = Environment::default();
        let a = self_containing(&mut env);
        let b = self_containing(&mut env);
        assert!(truth(&mut env, BinaryOp::Eq, a, b));
        assert!(!truth(&mut env, BinaryOp::NotEq, a, b));
        assert!(!truth(&mut env, BinaryOp::Less, a, b));
        assert!(truth(&mut env, BinaryOp::GreaterEq, a, b));

        let one = env.alloc_int(1).unwrap();
        if let Value::List(items) = env.get_mut(b).unwrap() {
            items.push(one);
        }
        assert!(!truth(&mut env, BinaryOp::Eq, a, b));
        assert!(truth(&mut env, BinaryOp::Less, a, b));
    }

    #[test]
    fn chars_render_as_raw_bytes() {
        let mut env = Environment::default();
        let c = env.alloc_char(0xc3).unwrap();
        assert_eq!(render_bytes(&env, c).unwrap(), b"'\xc3'");
        let xs = env.alloc_list(vec![c]).unwrap();
        assert_eq!(render_bytes(&env, xs).unwrap(), b"['\xc3']");
    }
}
