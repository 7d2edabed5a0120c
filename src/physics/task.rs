use {
    std::sync::mpsc,
    crate::{
        physics::Completion,
        r#type::Generation,
        scene::SceneSnapshot,
    }
};

pub struct Task {
    pub generation: Generation,
    pub snapshot: SceneSnapshot,
    pub completion: mpsc::Sender<Completion>,
}

impl Task {
    pub fn new(
        generation: Generation,
        snapshot: SceneSnapshot,
        completion: mpsc::Sender<Completion>,
    ) -> Self {
        Self {
            generation,
            snapshot,
            completion,
        }
    }
}
