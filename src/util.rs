//! Small list helpers.
//!
//! Types and substitutions are kept in plain `Vec`s, which is fine at the
//! sizes instance resolution deals with.

pub fn union<T>(left: &[T], right: &[T]) -> Vec<T>
where
    T: PartialEq + Clone,
{
    let mut buf = left.to_vec();

    for v in right {
        if !buf.contains(v) {
            buf.push(v.clone());
        }
    }

    buf
}

pub fn intersection<T>(left: &[T], right: &[T]) -> Vec<T>
where
    T: PartialEq + Clone,
{
    let mut buf = Vec::new();

    for l in left.iter() {
        if right.contains(l) {
            buf.push(l.clone())
        }
    }

    buf
}
