mod compiler;

pub use compiler::{
    compile_interaction_defs, compile_interaction_defs_from_str, ContentCompileError,
    ContentErrorCode, InteractionDefs, SourceLocation,
};
