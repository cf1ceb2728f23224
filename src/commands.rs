/// Available commands and autocomplete logic

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "new",
    aliases: &["n", "add", "create"],
    description: "Add a persona",
  },
  Command {
    name: "search",
    aliases: &["s", "find", "id"],
    description: "Filter by ID",
  },
  Command {
    name: "all",
    aliases: &["a", "reset", "show-all"],
    description: "Show all personas",
  },
  Command {
    name: "refresh",
    aliases: &["r", "reload"],
    description: "Reload from the server",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit p9s",
  },
];

/// How well `input` (already lowercased) matches a command; lower is better
fn rank(cmd: &Command, input: &str) -> Option<u32> {
  if cmd.name == input {
    Some(0)
  } else if cmd.aliases.contains(&input) {
    Some(1)
  } else if cmd.name.starts_with(input) {
    Some(2)
  } else if cmd.aliases.iter().any(|a| a.starts_with(input)) {
    Some(3)
  } else if cmd.name.contains(input) {
    Some(4)
  } else if cmd.aliases.iter().any(|a| a.contains(input)) {
    Some(5)
  } else {
    None
  }
}

/// Get autocomplete suggestions for a given input, best match first
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input = input.trim().to_lowercase();
  if input.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut ranked: Vec<(u32, &'static Command)> = COMMANDS
    .iter()
    .filter_map(|cmd| rank(cmd, &input).map(|r| (r, cmd)))
    .collect();
  // Stable sort keeps declaration order among equal ranks
  ranked.sort_by_key(|(r, _)| *r);
  ranked.into_iter().map(|(_, cmd)| cmd).collect()
}

/// Look up a command by exact name or alias
pub fn resolve(input: &str) -> Option<&'static Command> {
  get_suggestions(input)
    .into_iter()
    .next()
    .filter(|cmd| rank(cmd, &input.trim().to_lowercase()).is_some_and(|r| r <= 1))
}
