use anyhow::{Context, bail};
use sapper_core::Coord2;
use std::str::FromStr;

pub(crate) const HELP: &str = "\
commands:
  o ROW COL   open a cell
  f ROW COL   toggle a flag
  c ROW COL   chord: open the neighbours of a satisfied number
  n           new game
  r           show results
  h           this help
  q           quit";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Open(Coord2),
    Flag(Coord2),
    Chord(Coord2),
    NewGame,
    Results,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        use Command::*;

        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            bail!("empty command");
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "o" | "open" => Open(parse_coords(&mut parts)?),
            "f" | "flag" => Flag(parse_coords(&mut parts)?),
            "c" | "chord" => Chord(parse_coords(&mut parts)?),
            "n" | "new" => NewGame,
            "r" | "results" => Results,
            "h" | "help" | "?" => Help,
            "q" | "quit" | "exit" => Quit,
            other => bail!("unknown command `{}`, try `h`", other),
        };

        if let Some(extra) = parts.next() {
            bail!("unexpected argument `{}`", extra);
        }
        Ok(command)
    }
}

fn parse_coords<'a>(parts: &mut impl Iterator<Item = &'a str>) -> anyhow::Result<Coord2> {
    let row = parts
        .next()
        .context("missing row")?
        .parse()
        .context("row must be a number")?;
    let column = parts
        .next()
        .context("missing column")?
        .parse()
        .context("column must be a number")?;
    Ok((row, column))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cell_commands() {
        assert_eq!("o 3 4".parse::<Command>().unwrap(), Command::Open((3, 4)));
        assert_eq!("FLAG 0 8".parse::<Command>().unwrap(), Command::Flag((0, 8)));
        assert_eq!("  c 1   2 ".parse::<Command>().unwrap(), Command::Chord((1, 2)));
    }

    #[test]
    fn parses_bare_commands() {
        assert_eq!("n".parse::<Command>().unwrap(), Command::NewGame);
        assert_eq!("results".parse::<Command>().unwrap(), Command::Results);
        assert_eq!("?".parse::<Command>().unwrap(), Command::Help);
        assert_eq!("q".parse::<Command>().unwrap(), Command::Quit);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!("".parse::<Command>().is_err());
        assert!("o 1".parse::<Command>().is_err());
        assert!("o a b".parse::<Command>().is_err());
        assert!("o 1 300".parse::<Command>().is_err());
        assert!("n 1".parse::<Command>().is_err());
        assert!("dig 1 1".parse::<Command>().is_err());
    }
}
