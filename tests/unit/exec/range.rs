use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

fn executor(threads: usize, single_threaded: bool) -> RangeExecutor {
    RangeExecutor::new(
        Arc::new(build_thread_pool(Some(threads)).unwrap()),
        single_threaded,
    )
}

#[test]
fn every_index_runs_exactly_once_in_parallel() {
    let exec = executor(4, false);
    let hits: Vec<AtomicUsize> = (0..500).map(|_| AtomicUsize::new(0)).collect();
    exec.run(10..500, None, |i| {
        hits[i].fetch_add(1, Ordering::Relaxed);
        Ok(())
    })
    .unwrap();
    for (i, h) in hits.iter().enumerate() {
        let expected = usize::from(i >= 10);
        assert_eq!(h.load(Ordering::Relaxed), expected, "index {i}");
    }
}

#[test]
fn sequential_mode_runs_in_increasing_order() {
    let exec = executor(4, true);
    let seen = Mutex::new(Vec::new());
    exec.run(3..9, None, |i| {
        seen.lock().unwrap().push(i);
        Ok(())
    })
    .unwrap();
    assert_eq!(seen.into_inner().unwrap(), vec![3, 4, 5, 6, 7, 8]);
}

#[test]
fn sequential_cancellation_stops_before_next_unit() {
    let exec = executor(2, true);
    let cancel = CancelToken::new();
    let seen = Mutex::new(Vec::new());
    exec.run(0..10, Some(&cancel), |i| {
        seen.lock().unwrap().push(i);
        if i == 3 {
            cancel.cancel();
        }
        Ok(())
    })
    .unwrap();
    assert_eq!(seen.into_inner().unwrap(), vec![0, 1, 2, 3]);
}

#[test]
fn pre_cancelled_runs_nothing_in_either_mode() {
    let cancel = CancelToken::new();
    cancel.cancel();
    for single in [true, false] {
        let exec = executor(4, single);
        let count = AtomicUsize::new(0);
        exec.run(0..64, Some(&cancel), |_| {
            count.fetch_add(1, Ordering::Relaxed);
            Ok(())
        })
        .unwrap();
        assert_eq!(count.load(Ordering::Relaxed), 0);
    }
}

#[test]
fn parallel_cancellation_stops_new_units() {
    let exec = executor(2, false);
    let cancel = CancelToken::new();
    let count = AtomicUsize::new(0);
    exec.run(0..10_000, Some(&cancel), |_| {
        if count.fetch_add(1, Ordering::Relaxed) == 10 {
            cancel.cancel();
        }
        Ok(())
    })
    .unwrap();
    assert!(count.load(Ordering::Relaxed) < 10_000);
}

#[test]
fn unit_errors_propagate_in_both_modes() {
    for single in [true, false] {
        let exec = executor(4, single);
        let err = exec
            .run(0..100, None, |i| {
                if i == 42 {
                    Err(PixelFxError::render("line 42 failed"))
                } else {
                    Ok(())
                }
            })
            .unwrap_err();
        assert!(err.to_string().contains("line 42 failed"));
    }
}

#[test]
fn sequential_error_aborts_remaining_units() {
    let exec = executor(1, true);
    let count = AtomicUsize::new(0);
    let res = exec.run(0..10, None, |i| {
        count.fetch_add(1, Ordering::Relaxed);
        if i == 2 {
            return Err(PixelFxError::render("boom"));
        }
        Ok(())
    });
    assert!(res.is_err());
    assert_eq!(count.load(Ordering::Relaxed), 3);
}

#[test]
fn run_items_pairs_index_with_item() {
    for single in [true, false] {
        let exec = executor(3, single);
        let mut slots = vec![0usize; 20];
        let items: Vec<&mut usize> = slots.iter_mut().collect();
        exec.run_items(100, items, None, |i, slot| {
            *slot = i;
            Ok(())
        })
        .unwrap();
        assert_eq!(slots, (100..120).collect::<Vec<_>>());
    }
}

#[test]
fn empty_range_is_a_no_op() {
    let exec = executor(2, false);
    exec.run(5..5, None, |_| panic!("no units expected")).unwrap();
    exec.run_items(0, Vec::<u8>::new(), None, |_, _| panic!("no units expected"))
        .unwrap();
}

#[test]
fn zero_threads_is_rejected() {
    assert!(matches!(
        build_thread_pool(Some(0)),
        Err(PixelFxError::Validation(_))
    ));
}
