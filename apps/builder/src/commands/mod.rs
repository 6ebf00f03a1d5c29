// Session commands: one line of input in, one reply out.
// Parsing lives here; each command maps to one handler in `handlers`.

pub mod handlers;
pub mod notice;

use std::str::FromStr;

use crate::export::RasterSurface;
use crate::models::resume::ListName;
use crate::state::AppState;
use crate::steps::Step;

pub use notice::{Notice, NoticeVariant};

pub const HELP: &str = "\
Commands:
  help                      show this list
  show                      print the draft as JSON
  step                      show the current step and its fields
  tab <step>                jump to personal, experience, education or preview
  next                      validate this step and move on
  back                      go to the previous step
  set <path> <value...>     set a field, e.g. set experience.0.company Acme
  add <list>                add an entry to experience, education or skills
  remove <list> <index>     remove an entry (the last one is always kept)
  validate                  check the whole draft
  save                      save the draft locally
  submit                    validate, save and open the preview
  template [id]             list templates or pick one
  preview                   print the rendered resume
  export                    write the resume as a PDF
  quit                      leave the session";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Show,
    Step,
    Tab(Step),
    Next,
    Back,
    Set { path: String, value: String },
    Add(ListName),
    Remove(ListName, usize),
    Validate,
    Save,
    Submit,
    Template(Option<String>),
    Preview,
    Export,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        let no_args = |cmd: Command| {
            if args.is_empty() {
                Ok(cmd)
            } else {
                Err(format!("'{verb}' takes no arguments"))
            }
        };

        match verb.to_ascii_lowercase().as_str() {
            "help" | "?" => no_args(Command::Help),
            "show" => no_args(Command::Show),
            "step" => no_args(Command::Step),
            "tab" => match args.as_slice() {
                [step] => step.parse().map(Command::Tab),
                _ => Err("usage: tab <personal|experience|education|preview>".to_string()),
            },
            "next" => no_args(Command::Next),
            "back" => no_args(Command::Back),
            "set" => match rest.split_once(char::is_whitespace) {
                Some((path, value)) => Ok(Command::Set {
                    path: path.to_string(),
                    value: value.trim().to_string(),
                }),
                // A bare path clears the field.
                None if !rest.is_empty() => Ok(Command::Set {
                    path: rest.to_string(),
                    value: String::new(),
                }),
                None => Err("usage: set <path> <value...>".to_string()),
            },
            "add" => match args.as_slice() {
                [list] => list.parse().map(Command::Add),
                _ => Err("usage: add <experience|education|skills>".to_string()),
            },
            "remove" | "rm" => match args.as_slice() {
                [list, index] => {
                    let list = list.parse()?;
                    let index = index
                        .parse()
                        .map_err(|_| format!("'{index}' is not a valid index"))?;
                    Ok(Command::Remove(list, index))
                }
                _ => Err("usage: remove <experience|education|skills> <index>".to_string()),
            },
            "validate" => no_args(Command::Validate),
            "save" => no_args(Command::Save),
            "submit" => no_args(Command::Submit),
            "template" | "templates" => match args.as_slice() {
                [] => Ok(Command::Template(None)),
                [id] => Ok(Command::Template(Some(id.to_string()))),
                _ => Err("usage: template [id]".to_string()),
            },
            "preview" => no_args(Command::Preview),
            "export" | "download" => no_args(Command::Export),
            "quit" | "exit" | "q" => no_args(Command::Quit),
            "" => Err("empty command".to_string()),
            other => Err(format!("unknown command '{other}' (try 'help')")),
        }
    }
}

/// Export work handed back to the session loop, which runs it in the background.
pub struct ExportJob {
    pub surface: RasterSurface,
    pub full_name: String,
}

pub enum Effect {
    None,
    Export(ExportJob),
    Quit,
}

/// Output of one command.
pub struct Reply {
    pub lines: Vec<String>,
    pub notices: Vec<Notice>,
    pub effect: Effect,
}

impl Reply {
    pub fn lines(lines: Vec<String>) -> Self {
        Self {
            lines,
            notices: Vec::new(),
            effect: Effect::None,
        }
    }

    pub fn line(line: impl Into<String>) -> Self {
        Self::lines(vec![line.into()])
    }

    pub fn notice(notice: Notice) -> Self {
        Self {
            lines: Vec::new(),
            notices: vec![notice],
            effect: Effect::None,
        }
    }

    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notices.push(notice);
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }
}

/// Runs one command against the session. Errors become reply lines; nothing
/// here ends the session except `quit`.
pub fn dispatch(state: &mut AppState, command: Command) -> Reply {
    let result = match command {
        Command::Help => Ok(Reply::lines(HELP.lines().map(str::to_string).collect())),
        Command::Show => handlers::handle_show(state),
        Command::Step => Ok(handlers::handle_step(state)),
        Command::Tab(step) => Ok(handlers::handle_tab(state, step)),
        Command::Next => handlers::handle_next(state),
        Command::Back => Ok(handlers::handle_back(state)),
        Command::Set { path, value } => handlers::handle_set(state, &path, value),
        Command::Add(list) => Ok(handlers::handle_add(state, list)),
        Command::Remove(list, index) => handlers::handle_remove(state, list, index),
        Command::Validate => Ok(handlers::handle_validate(state)),
        Command::Save => handlers::handle_save(state),
        Command::Submit => handlers::handle_submit(state),
        Command::Template(id) => Ok(handlers::handle_template(state, id.as_deref())),
        Command::Preview => Ok(handlers::handle_preview(state)),
        Command::Export => Ok(handlers::handle_export(state)),
        Command::Quit => Ok(handlers::handle_quit(state)),
    };

    result.unwrap_or_else(|e| Reply::line(format!("error [{}]: {}", e.code(), e.user_message())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!("help".parse::<Command>().unwrap(), Command::Help);
        assert_eq!("  NEXT ".parse::<Command>().unwrap(), Command::Next);
        assert_eq!("q".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!("templates".parse::<Command>().unwrap(), Command::Template(None));
    }

    #[test]
    fn test_parse_set_keeps_value_spacing() {
        assert_eq!(
            "set personalInfo.summary  Builds  storage engines. ".parse::<Command>().unwrap(),
            Command::Set {
                path: "personalInfo.summary".to_string(),
                value: "Builds  storage engines.".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_set_without_value_clears() {
        assert_eq!(
            "set skills.0".parse::<Command>().unwrap(),
            Command::Set {
                path: "skills.0".to_string(),
                value: String::new(),
            }
        );
        assert!("set".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_list_commands() {
        assert_eq!(
            "add skills".parse::<Command>().unwrap(),
            Command::Add(ListName::Skills)
        );
        assert_eq!(
            "remove experience 2".parse::<Command>().unwrap(),
            Command::Remove(ListName::Experience, 2)
        );
        assert!("remove experience two".parse::<Command>().is_err());
        assert!("add hobbies".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_tab_and_template() {
        assert_eq!("tab preview".parse::<Command>().unwrap(), Command::Tab(Step::Preview));
        assert_eq!(
            "template modern".parse::<Command>().unwrap(),
            Command::Template(Some("modern".to_string()))
        );
        assert!("tab".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_and_extra_args() {
        assert!("dance".parse::<Command>().unwrap_err().contains("unknown command"));
        assert!("save now".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
    }
}
