//! Circular dependency and depth detection.

use std::thread::{self, ThreadId};

use crate::error::{DiError, DiResult};
use crate::identifier::Identifier;
use crate::internal::lock::Lock;
use crate::registration::Map;

/// Deepest resolution chain accepted, counted across delegating providers.
pub const MAX_RESOLUTION_DEPTH: usize = 100;

struct Frame {
    identifier: Identifier,
    depth: usize,
}

/// Identifiers currently under construction by one provider, one stack per
/// resolving thread.
#[derive(Default)]
pub(crate) struct ResolutionStacks {
    threads: Map<ThreadId, Vec<Frame>>,
}

impl ResolutionStacks {
    /// Chain depth of the innermost frame on the calling thread.
    pub(crate) fn depth(&self) -> usize {
        self.threads
            .get(&thread::current().id())
            .and_then(|frames| frames.last())
            .map_or(0, |frame| frame.depth)
    }

    #[cfg(test)]
    fn frames_on_current_thread(&self) -> usize {
        self.threads.get(&thread::current().id()).map_or(0, Vec::len)
    }
}

/// Keeps one identifier on the calling thread's stack for the duration of
/// its construction.
///
/// Dropping the guard pops the frame, so every exit path (success, error,
/// or unwinding out of a factory) leaves the stack as it found it.
pub(crate) struct StackGuard<'a> {
    stacks: &'a Lock<ResolutionStacks>,
    thread: ThreadId,
    identifier: Identifier,
    dependent: Option<Identifier>,
    depth: usize,
}

impl<'a> StackGuard<'a> {
    /// Pushes `identifier`. `outer_depth` is the chain depth already in flight
    /// in a delegating child provider, zero otherwise.
    pub(crate) fn enter(
        stacks: &'a Lock<ResolutionStacks>,
        identifier: &Identifier,
        outer_depth: usize,
    ) -> DiResult<Self> {
        let thread = thread::current().id();
        let mut state = stacks.lock();
        let frames = state.threads.entry(thread).or_default();

        // Circular detection BEFORE pushing the new identifier
        if frames.iter().any(|frame| frame.identifier == *identifier) {
            let mut path: Vec<Identifier> = frames.iter().map(|frame| frame.identifier.clone()).collect();
            path.push(identifier.clone());
            return Err(DiError::CircularDependency {
                identifier: identifier.clone(),
                path,
            });
        }

        // Depth guard
        let depth = frames.last().map_or(0, |frame| frame.depth).max(outer_depth) + 1;
        if depth > MAX_RESOLUTION_DEPTH {
            if frames.is_empty() {
                state.threads.remove(&thread);
            }
            return Err(DiError::RecursionLimit {
                identifier: identifier.clone(),
                depth,
            });
        }

        let dependent = frames.last().map(|frame| frame.identifier.clone());
        frames.push(Frame {
            identifier: identifier.clone(),
            depth,
        });

        Ok(Self {
            stacks,
            thread,
            identifier: identifier.clone(),
            dependent,
            depth,
        })
    }

    /// The identifier whose factory requested this one, if any.
    pub(crate) fn dependent(&self) -> Option<&Identifier> {
        self.dependent.as_ref()
    }

    /// Chain depth of this frame, counting delegating providers.
    pub(crate) fn depth(&self) -> usize {
        self.depth
    }
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.stacks.lock();
        if let Some(frames) = state.threads.get_mut(&self.thread) {
            if let Some(last) = frames.pop() {
                debug_assert_eq!(last.identifier, self.identifier);
            }
            if frames.is_empty() {
                state.threads.remove(&self.thread);
            }
        }
    }
}
