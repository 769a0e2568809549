/*!
 * Screenplay parsing and dialogue track assembly.
 *
 * - `parser`: script text to ordered `ScriptLine`s
 * - `assembler`: `ScriptLine`s to one audio track
 * - `report`: what happened to each line
 */

pub mod assembler;
pub mod parser;
pub mod report;

pub use assembler::{AssembledScene, SceneAssembler, LEAD_IN, LINE_GAP};
pub use parser::{clean_line, parse_script, split_visual_and_dialogue, ScriptLine};
pub use report::{AssemblyReport, LineOutcome, LineReport};
