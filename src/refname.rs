//! Relative dependency references
//!
//! TaskJuggler has no absolute task addressing. A reference is written
//! relative to the task declaring it: `!` climbs one level up, and
//! `.bug_<id>` descends into a named child.

use crate::task::Task;

/// Path from a task nested at `depth` to the task with `bug_id`, or
/// `None` when the target is nowhere in the forest.
///
/// The path first climbs out of the writer's nesting (`depth + 1`
/// ascend markers reach above the forest roots) and then descends along
/// the target's ancestor ids. The first task found in depth-first order
/// wins; ids are unique per forest, so at most one task matches.
pub fn relative_name(forest: &[Task], bug_id: u32, depth: usize) -> Option<String> {
    search(forest, bug_id, &"!".repeat(depth + 1))
}

fn search(tasks: &[Task], bug_id: u32, current: &str) -> Option<String> {
    for task in tasks {
        // Right after the ascend run the first segment attaches bare,
        // every later segment is dot-separated.
        let candidate = if current.ends_with('!') {
            format!("{current}bug_{}", task.bug_id)
        } else {
            format!("{current}.bug_{}", task.bug_id)
        };
        if task.bug_id == bug_id {
            return Some(candidate);
        }
        if let Some(found) = search(&task.children, bug_id, &candidate) {
            return Some(found);
        }
    }
    None
}
