use {
    std::{
        collections::hash_map::HashMap,
        io,
        sync::{
            atomic::{AtomicU64, Ordering},
            mpsc,
            Arc,
        },
    },
    threadpool::ThreadPool,
    serde::{ser::SerializeTuple, Serialize, Serializer},
    log::{
        trace,
        info,
        error,
    },
    crate::{
        error,
        make_error,
        shared_access,
        r#type::{
            BodyId,
            Distance,
            Generation,
            RelativeTime,
            SampleIndex,
            TimeFormat,
            Vector,
        },
        scene::{
            Body,
            SceneSnapshot,
            Track,
        },
        shared::Shared,
        Error,
        Result,
    },
};

pub mod forces;
pub mod integrator;
pub mod intersection;

mod task;

pub use intersection::Intersection;

use task::Task;

const LOG_TARGET: &'static str = "physics";

const TRACK_SAMPLE_FIELDS_LEN: usize = 6;

/// Observable state of the most recent computation. Terminal states stay
/// until the next request re-enters `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputationState {
    Idle,
    Running,
    Completed,
    Interrupted,
    Faulted,
}

impl Default for ComputationState {
    fn default() -> Self {
        Self::Idle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Computed,
    Empty,
    Faulted,
}

/// Completion notification. Carries no result payload: the result is
/// fetched separately through [`Engine::latest_result`], so the receiver
/// decides on which execution context to consume it.
#[derive(Debug, Clone, Copy)]
pub struct Completion {
    pub generation: Generation,
    pub outcome: Outcome,
}

impl Completion {
    fn new(generation: Generation, outcome: Outcome) -> Self {
        Self {
            generation,
            outcome,
        }
    }
}

/// Detects supersession of one computation. Requesters bump the shared
/// latest-generation counter before dispatch; a running computation polls
/// the watch between steps and abandons its work once a newer request
/// exists.
#[derive(Clone)]
pub struct GenerationWatch {
    latest: Arc<AtomicU64>,
    generation: Generation,
}

impl GenerationWatch {
    fn new(latest: Arc<AtomicU64>, generation: Generation) -> Self {
        Self {
            latest,
            generation,
        }
    }

    /// A watch that can never be superseded, for driving the integrator
    /// or the detector outside the engine.
    pub fn detached() -> Self {
        Self::new(Arc::new(AtomicU64::new(0)), 0)
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_superseded(&self) -> bool {
        self.latest.load(Ordering::SeqCst) != self.generation
    }
}

/// The published output of one completed computation: every body's track
/// plus the intersections found between them. Immutable once published;
/// readers hold an `Arc` to one generation and are never handed a result
/// still being written.
pub struct ComputationResult {
    generation: Generation,
    tracks: HashMap<BodyId, Track>,
    intersections: Vec<Intersection>,
}

impl ComputationResult {
    fn new(
        generation: Generation,
        tracks: HashMap<BodyId, Track>,
        intersections: Vec<Intersection>,
    ) -> Self {
        Self {
            generation,
            tracks,
            intersections,
        }
    }

    fn empty(generation: Generation) -> Self {
        Self::new(generation, HashMap::new(), vec![])
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn tracks(&self) -> &HashMap<BodyId, Track> {
        &self.tracks
    }

    pub fn track(&self, id: BodyId) -> Option<&Track> {
        self.tracks.get(&id)
    }

    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Streams every track sample as a CSV record
    /// `(body id, sample, time, x, y, z)`, bodies ordered by id.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);

        let mut ids: Vec<BodyId> = self.tracks.keys().copied().collect();
        ids.sort_unstable();

        for id in ids {
            let track = &self.tracks[&id];

            for (sample, location) in track.locations().iter().enumerate() {
                let time = sample as RelativeTime * track.step();
                writer.serialize(TrackSample(id, sample, time, location))?;
            }
        }

        writer.flush()?;

        Ok(())
    }
}

struct TrackSample<'t>(BodyId, SampleIndex, RelativeTime, &'t Vector);

impl Serialize for TrackSample<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let TrackSample(id, sample, time, location) = self;

        let mut tuple_seq = serializer.serialize_tuple(TRACK_SAMPLE_FIELDS_LEN)?;

        tuple_seq.serialize_element(id)?;
        tuple_seq.serialize_element(sample)?;
        tuple_seq.serialize_element(time)?;
        tuple_seq.serialize_element(&location[0])?;
        tuple_seq.serialize_element(&location[1])?;
        tuple_seq.serialize_element(&location[2])?;

        tuple_seq.end()
    }
}

/// The background computation controller. Owns one computational thread;
/// at most one computation is in flight, and a new request supersedes the
/// active one.
pub struct Engine {
    latest_generation: Arc<AtomicU64>,
    published: Shared<Arc<ComputationResult>>,
    state: Shared<ComputationState>,
    task_sender: mpsc::Sender<Task>,
}

impl Engine {
    pub fn new() -> Self {
        let latest_generation = Arc::new(AtomicU64::new(0));
        let published = Shared::from(Arc::new(ComputationResult::empty(0)));
        let state = Shared::from(ComputationState::default());
        let (task_sender, task_receiver) = mpsc::channel();

        let engine = Self {
            latest_generation,
            published,
            state,
            task_sender,
        };

        engine.spawn_computational_thread(task_receiver);

        engine
    }

    /// Starts a new computation from `snapshot` and returns its generation
    /// immediately; the caller never blocks on the work itself. An active
    /// computation is superseded unconditionally.
    ///
    /// On completion (normal, empty or faulted) a [`Completion`] is sent
    /// through `completion`; the caller drains that channel on whatever
    /// execution context is safe for its consumers. A superseded
    /// computation sends nothing.
    pub fn request_computation(
        &self,
        snapshot: SceneSnapshot,
        completion: mpsc::Sender<Completion>,
    ) -> Result<Generation> {
        let generation = self.latest_generation.fetch_add(1, Ordering::SeqCst) + 1;

        info! {
            target: LOG_TARGET,
            "computation #{}: requested ({} bodies, {} attractors, {} @ {})",
            generation,
            snapshot.bodies().len(),
            snapshot.attractors().len(),
            TimeFormat::VirtualTime(snapshot.parameters().duration),
            TimeFormat::VirtualTimeStep(snapshot.parameters().step)
        };

        self.task_sender
            .send(Task::new(generation, snapshot, completion))
            .map_err(|_| make_error![Error::Physics::Dispatch(
                "computational thread is gone".into()
            )])?;

        Ok(generation)
    }

    /// The latest published result. Never a partially computed one: results
    /// are replaced as a whole, and only by the newest computation.
    pub fn latest_result(&self) -> Result<Arc<ComputationResult>> {
        Ok(shared_access![self.published].clone())
    }

    pub fn state(&self) -> Result<ComputationState> {
        Ok(*shared_access![self.state])
    }

    fn spawn_computational_thread(&self, task_receiver: mpsc::Receiver<Task>) {
        std::thread::spawn({
            let published = self.published.share();
            let state = self.state.share();
            let latest_generation = Arc::clone(&self.latest_generation);

            move || {
                Self::computational_thread(published, state, latest_generation, task_receiver)
            }
        });
    }

    fn computational_thread(
        published: Shared<Arc<ComputationResult>>,
        state: Shared<ComputationState>,
        latest_generation: Arc<AtomicU64>,
        task_receiver: mpsc::Receiver<Task>,
    ) {
        let thread_pool = ThreadPool::default();

        loop {
            let mut task = match task_receiver.recv() {
                Ok(task) => task,
                Err(_) => return,
            };

            // only the newest queued request survives; the ones it
            // supersedes never start and get no completion
            while let Ok(newer) = task_receiver.try_recv() {
                trace! {
                    target: LOG_TARGET,
                    "computation #{}: superseded by #{} before start",
                    task.generation,
                    newer.generation
                };

                task = newer;
            }

            Self::run_task(&thread_pool, &published, &state, &latest_generation, task);
        }
    }

    fn set_state(state: &Shared<ComputationState>, new_state: ComputationState) {
        let mut state = shared_access![mut state];
        *state = new_state;
    }

    fn run_task(
        thread_pool: &ThreadPool,
        published: &Shared<Arc<ComputationResult>>,
        state: &Shared<ComputationState>,
        latest_generation: &Arc<AtomicU64>,
        task: Task,
    ) {
        let watch = GenerationWatch::new(Arc::clone(latest_generation), task.generation);

        if watch.is_superseded() {
            trace! {
                target: LOG_TARGET,
                "computation #{}: superseded before start",
                task.generation
            };

            return;
        }

        Self::set_state(state, ComputationState::Running);

        match Self::compute(thread_pool, &task.snapshot, &watch) {
            Ok(result) => {
                let outcome = if result.is_empty() {
                    Outcome::Empty
                } else {
                    Outcome::Computed
                };

                {
                    let mut published = shared_access![mut published];

                    // re-checked under the result lock: a superseded run
                    // must never overwrite a newer result
                    if watch.is_superseded() {
                        drop(published);
                        Self::set_state(state, ComputationState::Interrupted);

                        trace! {
                            target: LOG_TARGET,
                            "computation #{}: superseded before publish",
                            task.generation
                        };

                        return;
                    }

                    *published = Arc::new(result);
                }

                Self::set_state(state, ComputationState::Completed);

                info! {
                    target: LOG_TARGET,
                    "computation #{}: published ({:?})",
                    task.generation,
                    outcome
                };

                if task.completion
                    .send(Completion::new(task.generation, outcome))
                    .is_err()
                {
                    trace! {
                        target: LOG_TARGET,
                        "computation #{}: completion receiver is gone",
                        task.generation
                    };
                }
            },
            Err(Error::Physics(error::Physics::Superseded(_))) => {
                Self::set_state(state, ComputationState::Interrupted);

                trace! {
                    target: LOG_TARGET,
                    "computation #{}: interrupted",
                    task.generation
                };
            },
            Err(err) => {
                // faults never cross the thread boundary; the previously
                // published result stays untouched
                Self::set_state(state, ComputationState::Faulted);

                error! {
                    target: LOG_TARGET,
                    "computation #{}: {}",
                    task.generation,
                    err
                };

                if task.completion
                    .send(Completion::new(task.generation, Outcome::Faulted))
                    .is_err()
                {
                    trace! {
                        target: LOG_TARGET,
                        "computation #{}: completion receiver is gone",
                        task.generation
                    };
                }
            }
        }
    }

    fn compute(
        thread_pool: &ThreadPool,
        snapshot: &SceneSnapshot,
        watch: &GenerationWatch,
    ) -> Result<ComputationResult> {
        snapshot.parameters().validate()?;

        if snapshot.is_degenerate() {
            return Ok(ComputationResult::empty(watch.generation()));
        }

        let (track_sender, track_receiver) = mpsc::channel();

        for (group, indices) in snapshot.group_indices() {
            let bodies: Vec<Body> = indices
                .iter()
                .map(|&index| snapshot.bodies()[index].clone())
                .collect();
            let attractors = snapshot.attractors().to_vec();
            let parameters = snapshot.parameters().clone();
            let watch = watch.clone();
            let track_sender = track_sender.clone();

            thread_pool.execute(move || {
                let outcome = integrator::integrate_group(
                    &bodies,
                    &attractors,
                    &parameters,
                    &watch,
                );

                // the receiver is drained until every job's sender is gone,
                // so this send cannot fail
                track_sender.send((group, outcome)).unwrap();
            });
        }

        // the sender must only be available in the pool jobs, otherwise
        // the collection below never finishes
        drop(track_sender);

        let mut tracks = HashMap::with_capacity(snapshot.bodies().len());
        let mut failure = None;

        while let Ok((group, outcome)) = track_receiver.recv() {
            match outcome {
                Ok(group_tracks) => {
                    trace! {
                        target: LOG_TARGET,
                        "computation #{}: group {} integrated ({} tracks)",
                        watch.generation(),
                        group,
                        group_tracks.len()
                    };

                    tracks.extend(group_tracks);
                },
                Err(err) => failure = Some(err),
            }
        }

        if let Some(err) = failure {
            return Err(err);
        }

        // the intersection scan is group-agnostic: every pair of bodies is
        // checked, aligned by sample column
        let mut scan_input: Vec<(BodyId, Distance, &Track)> =
            Vec::with_capacity(snapshot.bodies().len());

        for body in snapshot.bodies() {
            if let Some(track) = tracks.get(&body.id()) {
                scan_input.push((body.id(), body.radius(), track));
            }
        }

        let intersections = intersection::find_intersections(
            &scan_input,
            snapshot.parameters().intersection_limit,
            watch,
        )?;

        Ok(ComputationResult::new(
            watch.generation(),
            tracks,
            intersections,
        ))
    }
}
