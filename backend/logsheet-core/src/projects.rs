// src/projects.rs
use std::collections::BTreeSet;

/// Union of the current and previous period's project names.
pub fn merge_project_names<I, J>(current: I, previous: J) -> BTreeSet<String>
where
    I: IntoIterator<Item = String>,
    J: IntoIterator<Item = String>,
{
    current.into_iter().chain(previous).collect()
}
