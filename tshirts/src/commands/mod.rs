//! One module per subcommand
//!
//! Every command takes the tracker, the AI backend and a [`Console`] so
//! that tests can drive it with in-memory fakes and scripted input.
//!
//! [`Console`]: crate::cli::Console

pub mod breakdown;
pub mod close;
pub mod estimate;
pub mod groom;
pub mod new;

pub use breakdown::{create_subtasks, subtasks_comment, CreatedSubtasks};
pub use estimate::EstimateSummary;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::cli::Console;
    use crate::repo::RepoRef;

    pub fn repo() -> RepoRef {
        RepoRef::new("owner", "repo").unwrap()
    }

    pub fn console(input: &'static str) -> Console<&'static [u8], Vec<u8>> {
        Console::new(input.as_bytes(), Vec::new())
    }

    pub fn printed(console: &Console<&'static [u8], Vec<u8>>) -> String {
        String::from_utf8_lossy(console.output()).into_owned()
    }
}
