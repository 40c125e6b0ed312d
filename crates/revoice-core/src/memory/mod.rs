mod process;
mod reader;

// Mock memory reader for unit and integration tests.
#[doc(hidden)]
pub mod mock;

pub use process::ProcessHandle;
pub use reader::{MemoryReader, ReadMemory};

#[doc(hidden)]
pub use mock::{MockMemoryBuilder, MockMemoryReader};
