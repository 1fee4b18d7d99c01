use super::*;

#[test]
fn test_span_basic() {
    let span = Span::new(5, 10);
    assert_eq!(span.len(), 5);
    assert!(!span.is_empty());
    assert_eq!(span.to_string(), "5..10");
}

#[test]
fn test_span_empty_and_dummy() {
    assert!(Span::at(7).is_empty());
    assert!(Span::dummy().is_dummy());
    assert!(!Span::new(0, 1).is_dummy());
}

#[test]
fn test_span_merge() {
    let a = Span::new(2, 6);
    let b = Span::new(4, 9);
    assert_eq!(a.merge(b), Span::new(2, 9));
    assert_eq!(b.merge(a), Span::new(2, 9));
}

#[test]
fn test_span_slice() {
    let text = "class Box<T> {}";
    assert_eq!(Span::new(6, 9).slice(text), "Box");
    // Out-of-range spans degrade to the empty string.
    assert_eq!(Span::new(100, 120).slice(text), "");
}

#[test]
fn test_pos_display() {
    let pos = Pos::new("box.vela", Span::new(6, 9));
    assert_eq!(pos.to_string(), "box.vela:6..9");
    assert_eq!(Pos::none().to_string(), "<no position>");
}

#[test]
fn test_pos_equality() {
    let a = Pos::new("a.vela", Span::new(1, 2));
    let b = Pos::new("a.vela", Span::new(1, 2));
    let c = Pos::new("a.vela", Span::new(1, 3));
    assert_eq!(a, b);
    assert_ne!(a, c);
}
