use deferral::{Deferred, Handle, Trampoline, Value};
use std::sync::{Arc, Mutex};

#[test]
fn test_schedule_does_not_run_job() {
    let trampoline = Trampoline::new();
    let ran = Arc::new(Mutex::new(false));

    let ran_clone = ran.clone();
    trampoline.handle().schedule(move || {
        *ran_clone.lock().unwrap() = true;
    });

    assert!(!*ran.lock().unwrap());
    assert_eq!(trampoline.len(), 1);

    assert!(trampoline.tick());
    assert!(*ran.lock().unwrap());
    assert!(!trampoline.tick());
}

#[test]
fn test_jobs_run_in_submission_order() {
    let trampoline = Trampoline::new();
    let handle = trampoline.handle();
    let order = Arc::new(Mutex::new(Vec::new()));

    for id in 0..5 {
        let order = order.clone();
        handle.schedule(move || order.lock().unwrap().push(id));
    }

    assert_eq!(trampoline.run_until_idle(), 5);
    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_run_until_idle_runs_nested_jobs() {
    let trampoline = Trampoline::new();
    let handle = trampoline.handle();
    let order = Arc::new(Mutex::new(Vec::new()));

    let outer_order = order.clone();
    let nested = handle.clone();
    handle.schedule(move || {
        outer_order.lock().unwrap().push("outer");
        let inner_order = outer_order.clone();
        nested.schedule(move || inner_order.lock().unwrap().push("inner"));
    });

    assert_eq!(trampoline.run_until_idle(), 2);
    assert_eq!(*order.lock().unwrap(), vec!["outer", "inner"]);
    assert!(trampoline.is_empty());
}

#[test]
fn test_jobs_run_with_handle_in_context() {
    let trampoline = Trampoline::new();
    let handle = trampoline.handle();
    let seen = Arc::new(Mutex::new(None));

    assert!(Handle::try_current().is_none());

    let seen_clone = seen.clone();
    handle.schedule(move || {
        *seen_clone.lock().unwrap() = Handle::try_current();
    });
    trampoline.run_until_idle();

    let current = seen.lock().unwrap().take().expect("no handle in job context");
    assert!(current.ptr_eq(&handle));
    assert!(Handle::try_current().is_none());
}

#[test]
fn test_enter_restores_previous_handle() {
    let first = Trampoline::new();
    let second = Trampoline::new();

    first.handle().enter(|| {
        second.handle().enter(|| {
            assert!(Handle::current().ptr_eq(&second.handle()));
        });
        assert!(Handle::current().ptr_eq(&first.handle()));
    });

    assert!(Handle::try_current().is_none());
}

#[test]
#[should_panic(expected = "no scheduler in context")]
fn test_new_outside_context_panics() {
    let _ = Deferred::new(|_| Ok(()));
}

#[test]
fn test_deferred_new_inside_reaction_uses_context() {
    let trampoline = Trampoline::new();

    let end = trampoline.handle().resolved(1).and_then(|_| {
        let created = Deferred::new(|resolver| {
            resolver.resolve("made in a reaction");
            Ok(())
        });
        Ok(Value::Deferred(created))
    });

    trampoline.run_until_idle();
    assert_eq!(
        end.outcome().map(|o| o.into_result()),
        Some(Ok(Value::from("made in a reaction")))
    );
}

#[test]
fn test_pair_uses_current_handle() {
    let trampoline = Trampoline::new();
    let pair = trampoline.handle().enter(deferral::pair);

    assert!(pair.deferred.handle().ptr_eq(&trampoline.handle()));

    pair.resolve(true);
    trampoline.run_until_idle();
    assert_eq!(
        pair.deferred.outcome().map(|o| o.into_result()),
        Some(Ok(Value::Bool(true)))
    );
}
