/// A unit of work deferred to a later frame.
///
/// Tasks receive the queue so they can post follow-up work, which runs on a
/// later frame, never the current one.
pub type Task = Box<dyn FnOnce(&mut TaskQueue)>;

/// Primary deferred-task queue.
///
/// The loop controller moves the whole queue into a working buffer before
/// running it, so anything posted while tasks run lands here and waits for the
/// next drain.
#[derive(Default)]
pub struct TaskQueue {
    tasks: Vec<Task>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post<F>(&mut self, task: F)
    where
        F: FnOnce(&mut TaskQueue) + 'static,
    {
        self.tasks.push(Box::new(task));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Moves every queued task into `working` (which must be empty), leaving
    /// this queue empty.
    pub(crate) fn swap_into(&mut self, working: &mut Vec<Task>) {
        debug_assert!(working.is_empty());
        std::mem::swap(&mut self.tasks, working);
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue").field("len", &self.tasks.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_moves_everything_in_order() {
        let mut q = TaskQueue::new();
        let out = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        for i in 0..3 {
            let out = out.clone();
            q.post(move |_| out.borrow_mut().push(i));
        }

        let mut working = Vec::new();
        q.swap_into(&mut working);
        assert!(q.is_empty());
        assert_eq!(working.len(), 3);

        for task in working.drain(..) {
            task(&mut q);
        }
        assert_eq!(*out.borrow(), vec![0, 1, 2]);
    }
}
