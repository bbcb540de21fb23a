//! Structural copier: isolation, cycles, shared substructure.

use strand0::{Copier, List, Map, Value, copy};

#[test]
fn scalars_pass_through() {
    for v in [Value::Null, Value::from(true), Value::from(7), Value::from(1.5), Value::from("s")] {
        assert_eq!(copy(&v), v);
    }
}

#[test]
fn nested_composites_are_fresh() {
    let inner = Value::list([1, 2]);
    let outer = Value::map([("inner", inner.clone())]);

    let cloned = copy(&outer);
    assert_ne!(cloned, outer);
    let cloned_inner = cloned.as_map().unwrap().get("inner").unwrap();
    assert_ne!(cloned_inner, inner);
    assert_eq!(cloned_inner.as_list().unwrap().snapshot(), vec![Value::from(1), Value::from(2)]);

    // Mutating the clone leaves the original alone.
    cloned_inner.as_list().unwrap().push(3);
    assert_eq!(inner.as_list().unwrap().len(), 2);
}

#[test]
fn self_reference_points_at_the_clone() {
    let x = Map::new();
    x.insert("name", "x");
    x.insert("self", x.clone());

    let y = copy(&Value::Map(x.clone()));
    let y = y.as_map().unwrap();

    assert!(!y.ptr_eq(&x));
    let back = y.get("self").unwrap();
    assert!(back.as_map().unwrap().ptr_eq(y));
    assert_eq!(y.get("name"), Some(Value::from("x")));
}

#[test]
fn indirect_cycle_terminates() {
    let a = List::new();
    let b = List::new();
    a.push(b.clone());
    b.push(a.clone());

    let a2 = copy(&Value::List(a.clone()));
    let a2 = a2.as_list().unwrap();
    let b2 = a2.get(0).unwrap();
    let b2 = b2.as_list().unwrap();
    assert!(!b2.ptr_eq(&b));
    assert!(b2.get(0).unwrap().as_list().unwrap().ptr_eq(a2));
}

#[test]
fn shared_substructure_stays_shared_within_one_pass() {
    let shared = Value::list([1]);
    let first = Value::map([("s", shared.clone())]);
    let second = Value::map([("s", shared.clone())]);

    let mut copier = Copier::new();
    let first2 = copier.copy(&first);
    let second2 = copier.copy(&second);

    let s1 = first2.as_map().unwrap().get("s").unwrap();
    let s2 = second2.as_map().unwrap().get("s").unwrap();
    assert_eq!(s1, s2);
    assert_ne!(s1, shared);
}
