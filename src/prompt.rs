use std::io::{BufRead, ErrorKind, Write};

use crate::controller::ReferenceLength;
use crate::error::Error;

/// Asks for the reference length on `output` and reads it from `input`.
///
/// Interactive mode re-prompts after an invalid answer, including a line that
/// is not valid UTF-8; otherwise the first invalid answer is returned as the
/// error. EOF counts as an empty answer.
pub fn prompt_reference_length<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    interactive: bool,
) -> Result<ReferenceLength, Error> {
    loop {
        // A closed stdout only loses the prompt text, not the answer.
        let _ = write!(output, "Reference length: ");
        let _ = output.flush();

        let mut line = String::new();
        let read = match input.read_line(&mut line) {
            Ok(n) => n,
            Err(e) if interactive && e.kind() == ErrorKind::InvalidData => {
                let _ = writeln!(output, "{}", Error::Input(e.to_string()));
                continue;
            }
            Err(e) => return Err(Error::Input(e.to_string())),
        };
        if read == 0 {
            let _ = writeln!(output);
            return Err(Error::InvalidReferenceLength(String::new()));
        }

        match line.parse::<ReferenceLength>() {
            Ok(len) => return Ok(len),
            Err(e) if interactive => {
                let _ = writeln!(output, "{e}");
            }
            Err(e) => return Err(e),
        }
    }
}
