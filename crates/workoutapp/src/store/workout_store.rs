use super::persistence::WorkoutPersistence;
use crate::error::{Result, WorkoutError};
use crate::model::Workout;
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Quiet period after the last mutation before the collection is written.
pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(500);

type Observer = Box<dyn Fn(&[Workout]) + Send + 'static>;

enum StoreCommand {
    Add {
        workout: Workout,
        reply: oneshot::Sender<()>,
    },
    AddAll {
        workouts: Vec<Workout>,
        reply: oneshot::Sender<()>,
    },
    AddNew {
        workouts: Vec<Workout>,
        reply: oneshot::Sender<Vec<Workout>>,
    },
    Update {
        workout: Workout,
        reply: oneshot::Sender<bool>,
    },
    Delete {
        id: Uuid,
        reply: oneshot::Sender<bool>,
    },
    Subscribe {
        id: u64,
        observer: Observer,
    },
    Unsubscribe {
        id: u64,
    },
    Flush {
        reply: oneshot::Sender<()>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Owns the collection. Runs as a single tokio task, so every mutation is
/// applied in arrival order without locks.
struct StoreActor<P> {
    receiver: mpsc::UnboundedReceiver<StoreCommand>,
    workouts: Vec<Workout>,
    persistence: P,
    observers: Vec<(u64, Observer)>,
    snapshot: watch::Sender<Arc<Vec<Workout>>>,
    save_delay: Duration,
    save_deadline: Option<Instant>,
}

impl<P: WorkoutPersistence> StoreActor<P> {
    async fn run(mut self) {
        debug!(count = self.workouts.len(), "workout store actor started");

        loop {
            let deadline = self.save_deadline;
            tokio::select! {
                command = self.receiver.recv() => match command {
                    Some(command) => {
                        if !self.handle(command) {
                            break;
                        }
                    }
                    None => break,
                },
                _ = wait_for(deadline), if deadline.is_some() => self.flush(),
            }
        }

        // Every handle is gone (or shutdown was requested): nothing may be lost.
        self.flush();
        debug!("workout store actor stopped");
    }

    /// Returns false once the store has been asked to stop.
    fn handle(&mut self, command: StoreCommand) -> bool {
        match command {
            StoreCommand::Add { workout, reply } => {
                self.workouts.push(workout);
                self.changed();
                let _ = reply.send(());
            }
            StoreCommand::AddAll { workouts, reply } => {
                if !workouts.is_empty() {
                    self.workouts.extend(workouts);
                    self.changed();
                }
                let _ = reply.send(());
            }
            StoreCommand::AddNew { workouts, reply } => {
                let mut seen: HashSet<Uuid> = self.workouts.iter().map(Workout::id).collect();
                let fresh: Vec<Workout> = workouts
                    .into_iter()
                    .filter(|w| seen.insert(w.id()))
                    .collect();
                if !fresh.is_empty() {
                    self.workouts.extend(fresh.iter().cloned());
                    self.changed();
                }
                let _ = reply.send(fresh);
            }
            StoreCommand::Update { workout, reply } => {
                let slot = self.workouts.iter_mut().find(|w| w.id() == workout.id());
                let replaced = match slot {
                    Some(slot) => {
                        *slot = workout;
                        true
                    }
                    None => false,
                };
                if replaced {
                    self.changed();
                }
                let _ = reply.send(replaced);
            }
            StoreCommand::Delete { id, reply } => {
                let removed = match self.workouts.iter().position(|w| w.id() == id) {
                    Some(index) => {
                        self.workouts.remove(index);
                        true
                    }
                    None => false,
                };
                if removed {
                    self.changed();
                }
                let _ = reply.send(removed);
            }
            StoreCommand::Subscribe { id, observer } => {
                self.observers.push((id, observer));
            }
            StoreCommand::Unsubscribe { id } => {
                self.observers.retain(|(observer_id, _)| *observer_id != id);
            }
            StoreCommand::Flush { reply } => {
                self.flush();
                let _ = reply.send(());
            }
            StoreCommand::Shutdown { reply } => {
                self.receiver.close();
                self.flush();
                let _ = reply.send(());
                return false;
            }
        }
        true
    }

    /// Publish the new state, notify observers and (re)arm the debounced save.
    fn changed(&mut self) {
        self.snapshot.send_replace(Arc::new(self.workouts.clone()));
        for (id, observer) in &self.observers {
            let workouts = &self.workouts;
            if catch_unwind(AssertUnwindSafe(|| observer(workouts))).is_err() {
                warn!(subscription = *id, "workout observer panicked");
            }
        }
        self.save_deadline = Some(Instant::now() + self.save_delay);
    }

    fn flush(&mut self) {
        if self.save_deadline.take().is_some() {
            self.persistence.save_workouts(&self.workouts);
        }
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Handle to the process-wide workout collection.
///
/// Cheap to clone; every clone talks to the same actor. Reads are served from
/// the last published snapshot, so they never observe a half-applied mutation.
#[derive(Clone)]
pub struct WorkoutStore {
    sender: mpsc::UnboundedSender<StoreCommand>,
    snapshot: watch::Receiver<Arc<Vec<Workout>>>,
    next_subscription: Arc<AtomicU64>,
}

impl WorkoutStore {
    /// Load the persisted collection and start the owning task.
    ///
    /// The initial load never schedules a save. Must be called from within a
    /// tokio runtime.
    pub fn open<P>(persistence: P, save_delay: Duration) -> Self
    where
        P: WorkoutPersistence + 'static,
    {
        let workouts = persistence.load_workouts();
        info!(count = workouts.len(), "opened workout store");

        let (sender, receiver) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot) = watch::channel(Arc::new(workouts.clone()));
        let actor = StoreActor {
            receiver,
            workouts,
            persistence,
            observers: Vec::new(),
            snapshot: snapshot_tx,
            save_delay,
            save_deadline: None,
        };
        tokio::spawn(actor.run());

        Self {
            sender,
            snapshot,
            next_subscription: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Snapshot of the collection, in insertion order.
    pub fn current(&self) -> Vec<Workout> {
        Vec::clone(&self.snapshot.borrow())
    }

    pub fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: Uuid) -> Option<Workout> {
        self.snapshot.borrow().iter().find(|w| w.id() == id).cloned()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.snapshot.borrow().iter().any(|w| w.id() == id)
    }

    pub async fn add(&self, workout: Workout) -> Result<()> {
        self.request(|reply| StoreCommand::Add { workout, reply })
            .await
    }

    /// Bulk append. An empty batch changes nothing and notifies no one.
    pub async fn add_all(&self, workouts: Vec<Workout>) -> Result<()> {
        self.request(|reply| StoreCommand::AddAll { workouts, reply })
            .await
    }

    /// Append only the workouts whose id is not stored yet, collapsing repeated
    /// ids within the batch to the first. The check and the insert happen in
    /// one step on the store task. Returns what was inserted.
    pub async fn add_new(&self, workouts: Vec<Workout>) -> Result<Vec<Workout>> {
        self.request(|reply| StoreCommand::AddNew { workouts, reply })
            .await
    }

    /// Replace the record with the same id. Returns false if there is none.
    pub async fn update(&self, workout: Workout) -> Result<bool> {
        self.request(|reply| StoreCommand::Update { workout, reply })
            .await
    }

    /// Remove the record with the same id. Returns false if there is none.
    pub async fn delete(&self, workout: &Workout) -> Result<bool> {
        self.delete_by_id(workout.id()).await
    }

    pub async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        self.request(|reply| StoreCommand::Delete { id, reply })
            .await
    }

    /// Register an observer. It runs on the store task after every mutation
    /// and receives the full updated collection.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&[Workout]) + Send + 'static,
    {
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        let _ = self.sender.send(StoreCommand::Subscribe {
            id,
            observer: Box::new(observer),
        });
        Subscription {
            id,
            sender: self.sender.downgrade(),
        }
    }

    /// Write any pending state now instead of waiting for the debounce window.
    pub async fn flush(&self) -> Result<()> {
        self.request(|reply| StoreCommand::Flush { reply }).await
    }

    /// Flush and stop the store. Later mutations fail with
    /// [`WorkoutError::StoreClosed`]; `current()` keeps the final snapshot.
    pub async fn shutdown(&self) {
        if self
            .request(|reply| StoreCommand::Shutdown { reply })
            .await
            .is_err()
        {
            debug!("workout store already stopped");
        }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> StoreCommand,
    ) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(command(reply))
            .map_err(|_| WorkoutError::StoreClosed)?;
        response.await.map_err(|_| WorkoutError::StoreClosed)
    }
}

/// Keeps an observer registered. Dropping it unsubscribes.
///
/// Holds only a weak sender so a forgotten subscription does not keep the
/// store task alive.
pub struct Subscription {
    id: u64,
    sender: mpsc::WeakUnboundedSender<StoreCommand>,
}

impl Subscription {
    /// Consumes the handle; the observer is removed before the next mutation.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(sender) = self.sender.upgrade() {
            let _ = sender.send(StoreCommand::Unsubscribe { id: self.id });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WorkoutCategory;
    use crate::test_utils::{workout_at, RecordingPersistence};
    use chrono::Utc;
    use std::sync::Mutex;
    use tokio::time::sleep;

    fn open_empty() -> (WorkoutStore, Arc<RecordingPersistence>) {
        let persistence = Arc::new(RecordingPersistence::new());
        let store = WorkoutStore::open(persistence.clone(), DEFAULT_SAVE_DELAY);
        (store, persistence)
    }

    fn quick(name: &str) -> Workout {
        Workout::new(Utc::now(), name, WorkoutCategory::Strength, vec![], "")
    }

    // --- Mutation Tests ---

    #[tokio::test]
    async fn test_add_preserves_insertion_order() {
        let (store, _) = open_empty();
        let w1 = quick("W1");
        let w2 = quick("W2");

        store.add(w1.clone()).await.unwrap();
        store.add(w2.clone()).await.unwrap();
        assert_eq!(store.current(), vec![w1.clone(), w2.clone()]);

        assert!(store.delete(&w1).await.unwrap());
        assert_eq!(store.current(), vec![w2]);
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_one() {
        let (store, _) = open_empty();
        let workouts: Vec<Workout> = (0..5).map(|i| quick(&format!("W{}", i))).collect();
        store.add_all(workouts.clone()).await.unwrap();

        for (removed, w) in workouts.iter().enumerate() {
            let before = store.len();
            store.delete(w).await.unwrap();
            assert!(!store.current().contains(w));
            assert_eq!(store.len(), before - 1);
            assert_eq!(store.len(), workouts.len() - removed - 1);
        }
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let (store, _) = open_empty();
        store.add(quick("kept")).await.unwrap();

        assert!(!store.delete(&quick("stranger")).await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_update_replaces_whole_record() {
        let (store, _) = open_empty();
        let original = quick("Legs");
        store.add(original.clone()).await.unwrap();

        let mut edited = original.clone();
        edited.notes = "heavy".to_string();
        assert!(store.update(edited.clone()).await.unwrap());
        assert_eq!(store.get(original.id()), Some(edited));

        assert!(!store.update(quick("unknown")).await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_add_new_skips_known_and_repeated_ids() {
        let (store, _) = open_empty();
        let known = quick("known");
        store.add(known.clone()).await.unwrap();

        let fresh = quick("fresh");
        let inserted = store
            .add_new(vec![known.clone(), fresh.clone(), fresh.clone()])
            .await
            .unwrap();
        assert_eq!(inserted, vec![fresh.clone()]);
        assert_eq!(store.current(), vec![known.clone(), fresh]);

        assert!(store.add_new(vec![known]).await.unwrap().is_empty());
        assert_eq!(store.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_add_new_stores_each_id_once() {
        let (store, _) = open_empty();
        let shared = quick("shared");

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let store = store.clone();
            let batch = vec![shared.clone()];
            tasks.spawn(async move { store.add_new(batch).await.unwrap().len() });
        }
        let mut inserted = 0;
        while let Some(count) = tasks.join_next().await {
            inserted += count.unwrap();
        }

        assert_eq!(inserted, 1);
        assert_eq!(store.current(), vec![shared]);
    }

    // --- Observer Tests ---

    #[tokio::test]
    async fn test_observers_receive_full_snapshots() {
        let (store, _) = open_empty();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let subscription = store.subscribe(move |workouts| {
            sink.lock().unwrap().push(workouts.len());
        });

        let first = quick("a");
        store.add(first.clone()).await.unwrap();
        store.add_all(vec![quick("b"), quick("c")]).await.unwrap();
        store.add_all(vec![]).await.unwrap();
        store.delete(&first).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![1, 3, 2]);

        subscription.unsubscribe();
        store.add(quick("d")).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![1, 3, 2]);
    }

    #[tokio::test]
    async fn test_noop_delete_does_not_notify() {
        let (store, _) = open_empty();
        let calls = Arc::new(Mutex::new(0));
        let sink = calls.clone();
        let _subscription = store.subscribe(move |_| *sink.lock().unwrap() += 1);

        store.delete(&quick("ghost")).await.unwrap();
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_observer_does_not_stop_the_store() {
        let (store, persistence) = open_empty();
        let calls = Arc::new(Mutex::new(0));
        let sink = calls.clone();
        let _bad = store.subscribe(|_| panic!("observer failure"));
        let _good = store.subscribe(move |_| *sink.lock().unwrap() += 1);

        store.add(quick("1")).await.unwrap();
        store.add(quick("2")).await.unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(*calls.lock().unwrap(), 2);

        store.shutdown().await;
        assert_eq!(persistence.save_count(), 1);
        assert_eq!(persistence.last_saved().unwrap().len(), 2);
    }

    // --- Debounced Persistence Tests ---

    #[tokio::test(start_paused = true)]
    async fn test_opening_does_not_save() {
        let persistence = Arc::new(RecordingPersistence::with_workouts(vec![
            workout_at(1),
            workout_at(2),
        ]));
        let store = WorkoutStore::open(persistence.clone(), DEFAULT_SAVE_DELAY);
        assert_eq!(store.len(), 2);

        sleep(Duration::from_secs(5)).await;
        assert_eq!(persistence.save_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_mutations_coalesce_into_one_save() {
        let (store, persistence) = open_empty();
        store.add(quick("1")).await.unwrap();
        store.add(quick("2")).await.unwrap();
        store.add(quick("3")).await.unwrap();

        sleep(Duration::from_millis(100)).await;
        assert_eq!(persistence.save_count(), 0);

        sleep(Duration::from_millis(500)).await;
        assert_eq!(persistence.save_count(), 1);
        assert_eq!(persistence.last_saved().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_mutation_restarts_the_window() {
        let (store, persistence) = open_empty();
        store.add(quick("1")).await.unwrap();
        sleep(Duration::from_millis(300)).await;
        store.add(quick("2")).await.unwrap();
        sleep(Duration::from_millis(300)).await;
        assert_eq!(persistence.save_count(), 0);

        sleep(Duration::from_millis(300)).await;
        assert_eq!(persistence.save_count(), 1);
        assert_eq!(persistence.last_saved().unwrap(), store.current());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_saves_pending_state_immediately() {
        let (store, persistence) = open_empty();
        store.flush().await.unwrap();
        assert_eq!(persistence.save_count(), 0);

        store.add(quick("1")).await.unwrap();
        store.flush().await.unwrap();
        assert_eq!(persistence.save_count(), 1);

        // nothing left pending
        sleep(Duration::from_secs(1)).await;
        assert_eq!(persistence.save_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_flushes_and_closes() {
        let (store, persistence) = open_empty();
        let w = quick("last");
        store.add(w.clone()).await.unwrap();

        store.shutdown().await;
        assert_eq!(persistence.save_count(), 1);
        assert_eq!(persistence.last_saved().unwrap(), vec![w.clone()]);

        assert!(matches!(
            store.add(quick("late")).await,
            Err(WorkoutError::StoreClosed)
        ));
        assert_eq!(store.current(), vec![w]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_every_handle_flushes() {
        let (store, persistence) = open_empty();
        let _subscription = store.subscribe(|_| {});
        store.add(quick("1")).await.unwrap();
        drop(store);

        sleep(Duration::from_millis(10)).await;
        assert_eq!(persistence.save_count(), 1);
    }
}
