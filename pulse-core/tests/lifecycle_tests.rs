use std::cell::RefCell as StdRefCell;
use std::rc::Rc;

use pulse_core::lifecycle::Lifecycle;

#[test]
fn test_mounted_and_destroy_hooks() {
    let lifecycle = Lifecycle::new();
    let v1 = Rc::new(StdRefCell::new(0));
    let v2 = Rc::new(StdRefCell::new(0));

    {
        let v1_clone = v1.clone();
        lifecycle.on_mounted(move || {
            *v1_clone.borrow_mut() = 1;
        });
    }
    {
        let v2_clone = v2.clone();
        lifecycle.before_destroy(move || {
            *v2_clone.borrow_mut() = 2;
        });
    }

    assert_eq!(lifecycle.run_mounted_hooks(), 1);
    assert_eq!(*v2.borrow(), 0);
    assert_eq!(lifecycle.run_destroy_hooks(), 1);

    assert_eq!(*v1.borrow(), 1);
    assert_eq!(*v2.borrow(), 2);

    // Hooks run once.
    assert_eq!(lifecycle.run_mounted_hooks(), 0);
    assert_eq!(lifecycle.run_destroy_hooks(), 0);
}

#[test]
fn destroy_hooks_run_in_reverse_order() {
    let lifecycle = Lifecycle::new();
    let order = Rc::new(StdRefCell::new(Vec::new()));
    for name in ["outer", "inner"] {
        let order = order.clone();
        lifecycle.before_destroy(move || order.borrow_mut().push(name));
    }
    assert_eq!(lifecycle.pending_destroy_hooks(), 2);
    lifecycle.run_destroy_hooks();
    assert_eq!(*order.borrow(), vec!["inner", "outer"]);
}

#[test]
fn trees_do_not_share_hooks() {
    let a = Lifecycle::new();
    let b = Lifecycle::new();
    let hit = Rc::new(StdRefCell::new(false));
    {
        let hit = hit.clone();
        a.on_mounted(move || *hit.borrow_mut() = true);
    }
    b.run_mounted_hooks();
    assert!(!*hit.borrow());
    a.run_mounted_hooks();
    assert!(*hit.borrow());
}
