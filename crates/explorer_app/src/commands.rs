//! Line commands typed at the explorer prompt.

use explorer_core::{JobSortMethod, NodeId, NodeSort, SortDirection, SpoolEncoding};

pub const HELP: &str = "\
Commands (NODE is the number shown in front of a tree row):
  ls [NODE]                 list the top level or the children of NODE
  add PROFILE               show a profile's session
  hide NODE                 remove a session from the tree
  search NODE               search jobs in a session
  refresh [NODE]            reload NODE, or every searched session
  fav NODE | unfav NODE     add or remove a favorite
  unfav-profile PROFILE     remove every favorite of a profile
  open-fav NODE             run or collapse a favorited search
  sort NODE METHOD [desc]   METHOD is id, date, name or rc
  filter NODE TEXT          show only jobs matching TEXT
  clear NODE                drop the local filter
  cat NODE                  print a spool file
  encoding NODE ENC         text, binary or a codepage such as IBM-1047
  poll NODE                 start (asks for an interval) or stop polling
  interval NODE MS          start polling with the given interval
  cancel NODE...            cancel jobs
  delete NODE...            delete jobs
  modify NODE | stop NODE   send a modify or stop command for a job
  focus PROFILE JOBID       show a single job
  copy NODE                 print JOBNAME(JOBID) or the label
  forget SEARCH             remove an entry from the search history
  forget-all                clear the search history
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List(Option<NodeId>),
    AddSession(String),
    HideSession(NodeId),
    Search(NodeId),
    Refresh(Option<NodeId>),
    AddFavorite(NodeId),
    RemoveFavorite(NodeId),
    RemoveFavoriteProfile(String),
    OpenFavorite(NodeId),
    Sort(NodeId, NodeSort),
    Filter(NodeId, String),
    ClearFilter(NodeId),
    Cat(NodeId),
    Encoding(NodeId, SpoolEncoding),
    Poll(NodeId),
    Interval(NodeId, String),
    Cancel(Vec<NodeId>),
    Delete(Vec<NodeId>),
    Modify(NodeId),
    Stop(NodeId),
    Focus(String, String),
    Copy(NodeId),
    ForgetSearch(String),
    ForgetAll,
    Help,
    Quit,
}

pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match verb {
        "ls" => Command::List(optional_node(&args)?),
        "add" => Command::AddSession(required(rest, "PROFILE")?),
        "hide" => Command::HideSession(node(&args)?),
        "search" => Command::Search(node(&args)?),
        "refresh" => Command::Refresh(optional_node(&args)?),
        "fav" => Command::AddFavorite(node(&args)?),
        "unfav" => Command::RemoveFavorite(node(&args)?),
        "unfav-profile" => Command::RemoveFavoriteProfile(required(rest, "PROFILE")?),
        "open-fav" => Command::OpenFavorite(node(&args)?),
        "sort" => Command::Sort(node(&args)?, sort(&args[1..])?),
        "filter" => {
            let id = node(&args)?;
            let text = rest.split_once(char::is_whitespace).map_or("", |(_, t)| t);
            Command::Filter(id, required(text, "TEXT")?)
        }
        "clear" => Command::ClearFilter(node(&args)?),
        "cat" => Command::Cat(node(&args)?),
        "encoding" => {
            let id = node(&args)?;
            let encoding = match args.get(1).copied() {
                Some("text") => SpoolEncoding::Text,
                Some("binary") => SpoolEncoding::Binary,
                Some(codepage) => SpoolEncoding::Other {
                    codepage: codepage.to_string(),
                },
                None => return Err("missing ENC".to_string()),
            };
            Command::Encoding(id, encoding)
        }
        "poll" => Command::Poll(node(&args)?),
        "interval" => {
            let id = node(&args)?;
            Command::Interval(id, required(args.get(1).copied().unwrap_or(""), "MS")?)
        }
        "cancel" => Command::Cancel(nodes(&args)?),
        "delete" => Command::Delete(nodes(&args)?),
        "modify" => Command::Modify(node(&args)?),
        "stop" => Command::Stop(node(&args)?),
        "focus" => match args.as_slice() {
            [profile, job_id] => Command::Focus(profile.to_string(), job_id.to_string()),
            _ => return Err("usage: focus PROFILE JOBID".to_string()),
        },
        "copy" => Command::Copy(node(&args)?),
        "forget" => Command::ForgetSearch(required(rest, "SEARCH")?),
        "forget-all" => Command::ForgetAll,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command {other:?}; type help")),
    };
    Ok(command)
}

fn required(text: &str, name: &str) -> Result<String, String> {
    let text = text.trim();
    if text.is_empty() {
        Err(format!("missing {name}"))
    } else {
        Ok(text.to_string())
    }
}

fn parse_node(text: &str) -> Result<NodeId, String> {
    text.parse()
        .map_err(|_| format!("{text:?} is not a node number"))
}

fn node(args: &[&str]) -> Result<NodeId, String> {
    args.first()
        .ok_or_else(|| "missing NODE".to_string())
        .and_then(|text| parse_node(text))
}

fn optional_node(args: &[&str]) -> Result<Option<NodeId>, String> {
    args.first().map(|text| parse_node(text)).transpose()
}

fn nodes(args: &[&str]) -> Result<Vec<NodeId>, String> {
    if args.is_empty() {
        return Err("missing NODE".to_string());
    }
    args.iter().map(|text| parse_node(text)).collect()
}

fn sort(args: &[&str]) -> Result<NodeSort, String> {
    let method = match args.first().copied() {
        Some("id") => JobSortMethod::Id,
        Some("date") => JobSortMethod::DateCompleted,
        Some("name") => JobSortMethod::Name,
        Some("rc") => JobSortMethod::ReturnCode,
        Some(other) => return Err(format!("unknown sort method {other:?}")),
        None => return Err("missing METHOD".to_string()),
    };
    let direction = match args.get(1).copied() {
        Some("desc") => SortDirection::Descending,
        Some("asc") | None => SortDirection::Ascending,
        Some(other) => return Err(format!("unknown sort direction {other:?}")),
    };
    Ok(NodeSort::new(method, direction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn node_arguments_are_parsed() {
        assert_eq!(parse("ls"), Ok(Command::List(None)));
        assert_eq!(parse(" ls 4 "), Ok(Command::List(Some(4))));
        assert_eq!(parse("cancel 3 5 8"), Ok(Command::Cancel(vec![3, 5, 8])));
        assert!(parse("cancel").is_err());
        assert!(parse("search x").is_err());
    }

    #[test]
    fn free_text_keeps_spaces() {
        assert_eq!(
            parse("filter 2 cc 0000"),
            Ok(Command::Filter(2, "cc 0000".to_string()))
        );
        assert_eq!(
            parse("forget Owner: zowe | Prefix: *"),
            Ok(Command::ForgetSearch("Owner: zowe | Prefix: *".to_string()))
        );
    }

    #[test]
    fn sort_and_encoding_options() {
        assert_eq!(
            parse("sort 2 rc desc"),
            Ok(Command::Sort(
                2,
                NodeSort::new(JobSortMethod::ReturnCode, SortDirection::Descending)
            ))
        );
        assert_eq!(
            parse("encoding 9 IBM-1047"),
            Ok(Command::Encoding(
                9,
                SpoolEncoding::Other {
                    codepage: "IBM-1047".to_string()
                }
            ))
        );
        assert!(parse("sort 2 owner").is_err());
    }

    #[test]
    fn unknown_verbs_are_rejected() {
        assert!(parse("frobnicate 1").unwrap_err().contains("unknown command"));
        assert_eq!(parse("exit"), Ok(Command::Quit));
    }
}
