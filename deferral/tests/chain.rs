mod common;

use common::{fulfilled, num, rejected};
use deferral::{Deferred, Error, Handler, State, Trampoline, Value};
use std::sync::{Arc, Mutex};

#[test]
fn test_chain_adds_then_doubles() {
    let trampoline = Trampoline::new();

    let last = trampoline.handle().enter(|| {
        Deferred::new(|resolver| {
            resolver.resolve(1);
            Ok(())
        })
        .and_then(|v| Ok(Value::from(num(&v) + 1.0)))
        .and_then(|v| Ok(Value::from(num(&v) * 2.0)))
    });

    trampoline.run_until_idle();
    assert_eq!(fulfilled(&last), Value::from(4));
}

#[test]
fn test_reaction_on_settled_value_runs_later() {
    let trampoline = Trampoline::new();
    let deferred = trampoline.handle().resolved(42);
    trampoline.run_until_idle();
    assert_eq!(deferred.state(), State::Fulfilled);

    let seen = Arc::new(Mutex::new(None));
    let seen_clone = seen.clone();
    deferred.and_then(move |v| {
        *seen_clone.lock().unwrap() = Some(v.clone());
        Ok(v)
    });

    assert!(seen.lock().unwrap().is_none(), "handler ran synchronously");
    assert!(!trampoline.is_empty());

    trampoline.run_until_idle();
    assert_eq!(*seen.lock().unwrap(), Some(Value::from(42)));
}

#[test]
fn test_reaction_does_not_run_inside_settling_call() {
    let trampoline = Trampoline::new();
    let pair = trampoline.handle().pair();
    let ran = Arc::new(Mutex::new(false));

    let ran_clone = ran.clone();
    pair.deferred.and_then(move |v| {
        *ran_clone.lock().unwrap() = true;
        Ok(v)
    });

    pair.resolve(1);
    assert!(!*ran.lock().unwrap());

    // The transition runs first, the reaction only in the following job.
    assert!(trampoline.tick());
    assert!(!*ran.lock().unwrap());

    trampoline.run_until_idle();
    assert!(*ran.lock().unwrap());
}

#[test]
fn test_attach_without_handlers_passes_rejection_through() {
    let trampoline = Trampoline::new();
    let deferred = trampoline.handle().rejected("boom");

    let passed = deferred.attach(None, None);

    trampoline.run_until_idle();
    assert_eq!(rejected(&passed), Value::from("boom"));
}

#[test]
fn test_attach_without_handlers_passes_value_through() {
    let trampoline = Trampoline::new();
    let passed = trampoline.handle().resolved("value").attach(None, None);

    trampoline.run_until_idle();
    assert_eq!(fulfilled(&passed), Value::from("value"));
}

#[test]
fn test_rejection_skips_success_handlers() {
    let trampoline = Trampoline::new();
    let calls = Arc::new(Mutex::new(0));

    let c1 = calls.clone();
    let c2 = calls.clone();
    let end = trampoline
        .handle()
        .rejected("original")
        .and_then(move |v| {
            *c1.lock().unwrap() += 1;
            Ok(v)
        })
        .and_then(move |v| {
            *c2.lock().unwrap() += 1;
            Ok(v)
        });

    trampoline.run_until_idle();
    assert_eq!(*calls.lock().unwrap(), 0);
    assert_eq!(rejected(&end), Value::from("original"));
}

#[test]
fn test_reactions_fire_in_attachment_order() {
    let trampoline = Trampoline::new();
    let pair = trampoline.handle().pair();
    let order = Arc::new(Mutex::new(Vec::new()));

    for id in 1..=4 {
        let order = order.clone();
        pair.deferred.and_then(move |v| {
            order.lock().unwrap().push(id);
            Ok(v)
        });
    }

    pair.resolve(());
    trampoline.run_until_idle();

    assert_eq!(*order.lock().unwrap(), vec![1, 2, 3, 4]);
}

#[test]
fn test_failure_reactions_fire_in_attachment_order() {
    let trampoline = Trampoline::new();
    let pair = trampoline.handle().pair();
    let order = Arc::new(Mutex::new(Vec::new()));

    for id in 1..=3 {
        let order = order.clone();
        pair.deferred.catch(move |r| {
            order.lock().unwrap().push(id);
            Err(r)
        });
    }

    pair.reject("no");
    trampoline.run_until_idle();

    assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
}

#[test]
fn test_catch_recovers() {
    let trampoline = Trampoline::new();
    let recovered = trampoline
        .handle()
        .rejected("boom")
        .catch(|reason| {
            assert_eq!(reason, Value::from("boom"));
            Ok(Value::from("recovered"))
        })
        .and_then(|v| Ok(Value::from(format!("{}!", v.as_str().unwrap()))));

    trampoline.run_until_idle();
    assert_eq!(fulfilled(&recovered), Value::from("recovered!"));
}

#[test]
fn test_catch_can_raise_again() {
    let trampoline = Trampoline::new();
    let end = trampoline
        .handle()
        .rejected("first")
        .catch(|_| Err(Value::from("second")));

    trampoline.run_until_idle();
    assert_eq!(rejected(&end), Value::from("second"));
}

#[test]
fn test_then_routes_to_matching_handler() {
    let trampoline = Trampoline::new();
    let handle = trampoline.handle();

    let on_ok = handle
        .resolved(1)
        .then(|_| Ok(Value::from("success")), |_| Ok(Value::from("failure")));
    let on_err = handle
        .rejected(1)
        .then(|_| Ok(Value::from("success")), |_| Ok(Value::from("failure")));

    trampoline.run_until_idle();
    assert_eq!(fulfilled(&on_ok), Value::from("success"));
    assert_eq!(fulfilled(&on_err), Value::from("failure"));
}

#[test]
fn test_handler_error_rejects_downstream() {
    let trampoline = Trampoline::new();
    let end = trampoline
        .handle()
        .resolved(1)
        .and_then(|_| Err(Value::Error(Error::raised("handler failed"))));

    trampoline.run_until_idle();
    assert_eq!(rejected(&end), Value::Error(Error::raised("handler failed")));
}

#[test]
fn test_handler_panic_rejects_downstream() {
    let trampoline = Trampoline::new();
    let end = trampoline
        .handle()
        .resolved(1)
        .and_then(|_| -> Result<Value, Value> { panic!("handler exploded") });

    trampoline.run_until_idle();
    assert_eq!(rejected(&end), Value::Error(Error::raised("handler exploded")));
    assert!(trampoline.is_empty());
}

#[test]
fn test_handler_returning_deferred_is_adopted() {
    let trampoline = Trampoline::new();
    let handle = trampoline.handle();
    let later = handle.pair();

    let inner = later.deferred.clone();
    let end = handle.resolved(1).and_then(move |_| Ok(Value::Deferred(inner)));

    trampoline.run_until_idle();
    assert!(end.is_pending());

    later.resolve("later");
    trampoline.run_until_idle();
    assert_eq!(fulfilled(&end), Value::from("later"));
}

#[test]
fn test_handler_returning_rejected_deferred_rejects() {
    let trampoline = Trampoline::new();
    let handle = trampoline.handle();
    let failing = handle.rejected("inner");

    let end = handle.resolved(1).and_then(move |_| Ok(Value::Deferred(failing)));

    trampoline.run_until_idle();
    assert_eq!(rejected(&end), Value::from("inner"));
}

#[test]
fn test_returning_own_downstream_is_type_error() {
    let trampoline = Trampoline::new();
    let slot: Arc<Mutex<Option<Deferred>>> = Arc::new(Mutex::new(None));

    let slot_clone = slot.clone();
    let downstream = trampoline.handle().resolved(1).and_then(move |_| {
        let own = slot_clone.lock().unwrap().take().expect("downstream not stored");
        Ok(Value::Deferred(own))
    });
    *slot.lock().unwrap() = Some(downstream.clone());

    let ran = trampoline.run_until_idle();
    assert!(ran < 10, "self resolution must not loop, ran {ran} jobs");

    let reason = rejected(&downstream);
    assert!(
        reason.as_error().is_some_and(Error::is_type_error),
        "expected a type error, got {reason:?}"
    );
}

#[test]
fn test_explicit_handlers_through_attach() {
    let trampoline = Trampoline::new();
    let on_success: Handler = Box::new(|v| Ok(Value::from(num(&v) * 10.0)));

    let end = trampoline.handle().resolved(5).attach(Some(on_success), None);

    trampoline.run_until_idle();
    assert_eq!(fulfilled(&end), Value::from(50));
}

#[test]
fn test_branches_from_one_value_are_independent() {
    let trampoline = Trampoline::new();
    let root = trampoline.handle().resolved(3);

    let doubled = root.and_then(|v| Ok(Value::from(num(&v) * 2.0)));
    let failed = root.and_then(|_| Err(Value::from("branch failed")));
    let squared = root.and_then(|v| Ok(Value::from(num(&v) * num(&v))));

    trampoline.run_until_idle();
    assert_eq!(fulfilled(&doubled), Value::from(6));
    assert_eq!(rejected(&failed), Value::from("branch failed"));
    assert_eq!(fulfilled(&squared), Value::from(9));
    assert_eq!(fulfilled(&root), Value::from(3));
}

#[test]
fn test_chained_values_share_the_scheduler() {
    let trampoline = Trampoline::new();
    let handle = trampoline.handle();
    let chained = handle.resolved(1).and_then(Ok).catch(Err);

    assert!(chained.handle().ptr_eq(&handle));
}
