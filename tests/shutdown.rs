mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{RecordingReporter, next_event};
use ordervisor::{
    Config, Event, EventKind, LogWriter, OrderError, OrderId, OrderSpec, RouterBuilder,
    RuntimeError, Signal, Status, Subscribe,
};
use tokio::sync::{Mutex, broadcast, oneshot};

#[derive(Default)]
struct KindRecorder {
    kinds: Mutex<Vec<EventKind>>,
}

#[async_trait]
impl Subscribe for KindRecorder {
    async fn on_event(&self, event: &Event) {
        self.kinds.lock().await.push(event.kind);
    }

    fn name(&self) -> &'static str {
        "kind-recorder"
    }
}

#[tokio::test]
async fn shutdown_waits_for_live_orders_and_rejects_new_ones() -> anyhow::Result<()> {
    let reporter = Arc::new(RecordingReporter::default());
    let router = RouterBuilder::new(Config::default())
        .with_reporter(reporter.clone())
        .build();
    let mut events = router.events();

    let id = router.start(OrderSpec::new(["Chop"]).with_id("late-table")).await?;
    let waiter = router.subscribe(&id).await?;

    let draining = {
        let router = router.clone();
        tokio::spawn(async move { router.shutdown().await })
    };
    loop {
        let ev = events.recv().await?;
        if ev.kind == EventKind::ShutdownRequested {
            break;
        }
    }

    assert_eq!(
        router.start(OrderSpec::new(["Toast"])).await.err(),
        Some(OrderError::ShuttingDown)
    );

    // Live orders still take signals while draining.
    router.signal(&id, Signal::step("Chop", false)).await?;
    assert_eq!(waiter.recv().await?.status, Status::Completed);

    draining.await??;
    assert_eq!(reporter.count_for(&id), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn grace_exceeded_cancels_stuck_orders() -> anyhow::Result<()> {
    let reporter = Arc::new(RecordingReporter::default());
    let cfg = Config {
        grace: Duration::from_secs(1),
        ..Config::default()
    };
    let router = RouterBuilder::new(cfg)
        .with_reporter(reporter.clone())
        .build();
    let mut events = router.events();

    let running = router.start(OrderSpec::new(["Chop", "Mix"]).with_id("a-running")).await?;
    let staged = router.stage(OrderSpec::new(["Chop"]).with_id("b-staged")).await?;
    let running_waiter = router.subscribe(&running).await?;
    let staged_waiter = router.subscribe(&staged).await?;

    let err = router.shutdown().await.unwrap_err();
    match &err {
        RuntimeError::GraceExceeded { grace, stuck } => {
            assert_eq!(*grace, Duration::from_secs(1));
            assert_eq!(stuck, &vec!["a-running".to_string(), "b-staged".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.as_label(), "runtime_grace_exceeded");

    assert_eq!(running_waiter.recv().await?.status, Status::Cancelled);
    assert_eq!(staged_waiter.recv().await?.status, Status::Cancelled);
    next_event(&mut events, EventKind::OrderRetired, &running).await;
    assert!(router.live_orders().await.is_empty());
    assert_eq!(reporter.outcomes().len(), 2);
    Ok(())
}

#[tokio::test]
async fn subscribers_see_the_session_lifecycle() -> anyhow::Result<()> {
    let recorder = Arc::new(KindRecorder::default());
    let subs: Vec<Arc<dyn Subscribe>> = vec![recorder.clone(), Arc::new(LogWriter::new())];
    let router = RouterBuilder::new(Config::default())
        .with_subscribers(subs)
        .build();

    let id = router.start(OrderSpec::new(["Chop"])).await?;
    let waiter = router.subscribe(&id).await?;
    router.signal(&id, Signal::step("Chop", true)).await?;
    waiter.recv().await?;
    router.shutdown().await?;

    // Shutdown returns only after subscribers drained their queues.
    let expected = [
        EventKind::OrderCreated,
        EventKind::OrderStarted,
        EventKind::StepValidated,
        EventKind::OrderFinished,
        EventKind::OutcomeReported,
        EventKind::OrderRetired,
        EventKind::ShutdownRequested,
        EventKind::AllStoppedWithin,
    ];
    assert_eq!(*recorder.kinds.lock().await, expected);
    Ok(())
}

#[tokio::test]
async fn shutdown_trigger_names_the_drain_reason() -> anyhow::Result<()> {
    let recorder = Arc::new(KindRecorder::default());
    let subs: Vec<Arc<dyn Subscribe>> = vec![recorder.clone()];
    let router = RouterBuilder::new(Config::default())
        .with_subscribers(subs)
        .build();
    let mut events = router.events();
    let mut order = router.follow("fire-drill");

    let id = router.start(OrderSpec::new(["Chop"]).with_id("fire-drill")).await?;
    let (trigger_tx, trigger_rx) = oneshot::channel::<&'static str>();
    let draining = {
        let router = router.clone();
        tokio::spawn(async move {
            router
                .shutdown_when(async move { trigger_rx.await.unwrap_or("trigger_dropped") })
                .await
        })
    };

    // Nothing drains before the trigger fires.
    assert!(order.next_of(EventKind::OrderStarted).await.is_some());
    assert_eq!(router.live_orders().await, vec![id.clone()]);
    router.start(OrderSpec::new(["Toast"]).with_id("second-table")).await?;
    router.signal(&OrderId::from("second-table"), Signal::Cancel).await?;

    trigger_tx.send("fire drill").map_err(|_| anyhow::anyhow!("drain task gone"))?;
    let requested = next_kind(&mut events, EventKind::ShutdownRequested).await;
    assert_eq!(requested.reason.as_deref(), Some("fire drill"));

    router.signal(&id, Signal::step("Chop", false)).await?;
    draining.await??;

    let finished = order.next_of(EventKind::OrderFinished).await.expect("finish event");
    assert_eq!(finished.status, Some(Status::Completed));
    assert_eq!(recorder.kinds.lock().await.last(), Some(&EventKind::AllStoppedWithin));
    Ok(())
}

async fn next_kind(rx: &mut broadcast::Receiver<Event>, kind: EventKind) -> Event {
    loop {
        let ev = rx.recv().await.expect("bus closed");
        if ev.kind == kind {
            return ev;
        }
    }
}

#[cfg(unix)]
#[tokio::test]
async fn sigterm_drains_the_router() -> anyhow::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    // Keeps SIGTERM handled for the whole process while the router registers its own.
    let _guard = signal(SignalKind::terminate())?;
    let router = RouterBuilder::new(Config::default()).build();
    let mut events = router.events();

    let draining = {
        let router = router.clone();
        tokio::spawn(async move { router.shutdown_on_signal().await })
    };

    let mut requested = None;
    for _ in 0..50 {
        std::process::Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()?;
        if let Ok(ev) =
            tokio::time::timeout(Duration::from_millis(100), next_kind(&mut events, EventKind::ShutdownRequested)).await
        {
            requested = Some(ev);
            break;
        }
    }
    let requested = requested.ok_or_else(|| anyhow::anyhow!("SIGTERM never reached the router"))?;
    assert_eq!(requested.reason.as_deref(), Some("sigterm"));

    draining.await??;
    assert_eq!(
        router.start(OrderSpec::new(["Chop"])).await.err(),
        Some(OrderError::ShuttingDown)
    );
    Ok(())
}
