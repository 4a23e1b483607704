//! Integration tests for concurrent use of a shared reflector.

use std::{
    sync::{Arc, Barrier},
    thread,
};

use dotreflect::{prelude::*, Result};

const THREADS: usize = 8;

fn counter_type(reflector: &Reflector) -> Result<RuntimeTypeRc> {
    let registry = reflector.registry();
    registry
        .class("Sample", "Counter")
        .field("Count", registry.int64())
        .auto_property("Label", registry.string())
        .default_constructor()
        .build()
}

#[test]
fn test_concurrent_warm_up_emits_once() -> Result<()> {
    let reflector = Reflector::new();
    let counter = counter_type(&reflector)?;
    let barrier = Arc::new(Barrier::new(THREADS));

    let getters = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let (reflector, counter, barrier) = (&reflector, &counter, barrier.clone());
                scope.spawn(move || {
                    barrier.wait();
                    reflector.getter(counter, "Count")
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker panicked"))
            .collect::<Result<Vec<_>>>()
    })?;

    assert!(getters.windows(2).all(|pair| pair[0].ptr_eq(&pair[1])));
    let stats = reflector.cache().stats().get(AccessorKind::FieldGetter);
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, THREADS as u64 - 1);
    Ok(())
}

#[test]
fn test_accessors_are_shared_across_threads() -> Result<()> {
    let reflector = Reflector::new();
    let counter = counter_type(&reflector)?;
    let instances: Vec<Value> = (0..THREADS)
        .map(|_| counter.create_instance(&reflector, &[]))
        .collect::<Result<_>>()?;

    let setter = reflector.setter(&counter, "Count")?;
    let getter = reflector.getter(&counter, "Count")?;

    thread::scope(|scope| {
        for (index, instance) in instances.iter().enumerate() {
            let setter = setter.clone();
            scope.spawn(move || setter.set(instance, index as i64));
        }
    });

    for (index, instance) in instances.iter().enumerate() {
        assert_eq!(getter.get(instance)?, Value::I64(index as i64));
    }
    Ok(())
}

#[test]
fn test_prepare_from_clones() -> Result<()> {
    let reflector = Reflector::new();
    let counter = counter_type(&reflector)?;

    let prepared = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let (reflector, counter) = (reflector.clone(), counter.clone());
                scope.spawn(move || reflector.prepare(&counter))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker panicked"))
            .collect::<Result<Vec<_>>>()
    })?;

    assert!(prepared.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(reflector.cache().len(), prepared[0]);
    Ok(())
}
