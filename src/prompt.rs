//! Interactive operator prompts

use crate::config::{ChainConfig, ChainRegistry};
use crate::error::{MinterError, MinterResult};

use std::io::{BufRead, Write};

/// Ask for a chain name until one from the registry is entered
pub fn select_chain<'a, R, W>(
    registry: &'a ChainRegistry,
    input: &mut R,
    output: &mut W,
) -> MinterResult<&'a ChainConfig>
where
    R: BufRead,
    W: Write,
{
    loop {
        ask(
            output,
            &format!("Enter one of chain names\n{:?}: ", registry.names()),
        )?;
        let answer = read_answer(input)?;
        if let Some(chain) = registry.get(answer.trim()) {
            return Ok(chain);
        }
    }
}

/// Ask for a positive mint count until one is entered
pub fn read_mint_count<R, W>(input: &mut R, output: &mut W) -> MinterResult<u64>
where
    R: BufRead,
    W: Write,
{
    loop {
        ask(output, "Enter count nfts to mint: ")?;
        let answer = read_answer(input)?;
        match answer.trim().parse::<u64>() {
            Ok(count) if count > 0 => return Ok(count),
            _ => continue,
        }
    }
}

fn ask<W: Write>(output: &mut W, question: &str) -> MinterResult<()> {
    output
        .write_all(question.as_bytes())
        .and_then(|_| output.flush())
        .map_err(|e| MinterError::Input(e.to_string()))
}

fn read_answer<R: BufRead>(input: &mut R) -> MinterResult<String> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|e| MinterError::Input(e.to_string()))?;
    if read == 0 {
        return Err(MinterError::Input("input closed before an answer was given".to_string()));
    }
    Ok(line)
}
