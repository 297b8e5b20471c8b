use super::*;
use crate::{
    analysis::contains::Contains,
    bool2d::shape::Shape,
};
use test_log::test;

fn pair() -> (SubSetR2, SubSetR2) {
    (primitive::square(2., (-3., 0.)).unwrap(), primitive::square(2., (3., 0.)).unwrap())
}

#[test]
fn two_squares() {
    let (a, b) = pair();
    let union = clean(&a | &b);
    let SubSetR2::Shape(Shape::Disjoint(d)) = &union else { panic!("expected disjoint shape, got {}", union) };
    assert_eq!(d.components().len(), 2);
    for component in d.components() {
        assert_relative_eq!(component.area(), 4.);
    }
    assert_relative_eq!(union.area().unwrap(), a.area().unwrap() + b.area().unwrap());
    assert!(union.contains(&R2 { x: -3., y: 0. }));
    assert!(union.contains(&R2 { x: 3., y: 1. }));
    assert!(!union.contains(&R2 { x: 0., y: 0. }));
    assert!(clean(&a & &b).is_empty());
    assert_eq!(clean(&a - &b), a);
}

#[test]
fn complement() {
    let (a, b) = pair();
    let union = clean(&a | &b);
    let outside = (!&union).simplify();
    let SubSetR2::Shape(Shape::Connected(c)) = &outside else { panic!("expected connected shape, got {}", outside) };
    assert!(c.outer().is_none());
    assert_eq!(c.holes().count(), 2);
    assert_relative_eq!(outside.area().unwrap(), -8.);
    assert!(outside.contains(&R2 { x: 0., y: 0. }));
    assert!(!outside.contains(&R2 { x: 3., y: 0. }));
    assert_eq!(!&outside, union);
    assert_eq!(clean(!&a & !&b), outside);
}

#[test]
fn islands_in_a_hole() {
    let frame = clean(primitive::square(20., (0., 0.)).unwrap() - primitive::square(16., (0., 0.)).unwrap());
    let (a, b) = pair();
    let all = clean(SubSetR2::unite([frame.clone(), a.clone(), b.clone()]));
    let SubSetR2::Shape(Shape::Disjoint(d)) = &all else { panic!("expected disjoint shape, got {}", all) };
    assert_eq!(d.components().len(), 3);
    assert_relative_eq!(all.area().unwrap(), 400. - 256. + 8.);
    assert!(all.contains_subset(&a).unwrap());
    assert!(all.contains_subset(&frame).unwrap());
    assert!(!all.contains_subset(&primitive::square(1., (0., 0.)).unwrap()).unwrap());
}
