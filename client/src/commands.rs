//! Console command parsing
//!
//! Turns lines typed at the prompt into protocol commands:
//!
//! ```text
//! place 3 0 -2 [#44aa88]    attack <voxelId>    fortify <voxelId>
//! destroy <voxelId>         repair <voxelId>
//! team create <name>        team join <teamId>
//! say <text>                tsay <text>
//! pause | resume            admin {"attackDamage": 40}
//! status | help | quit
//! ```

use serde_json::{json, Value};
use shared::{CellKey, ClientMessage, Vector3};

/// What a console line asks the client to do
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Send(ClientMessage),
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
place <x> <y> <z> [color]   build a voxel in the cell containing (x, y, z)
attack <voxelId>            damage an enemy voxel
fortify <voxelId>           raise one of your voxels a tier
destroy <voxelId>           demolish your own (or a teammate's, as leader)
repair <voxelId>            restore the allied structure around a voxel
team create <name>          found a team and lead it
team join <teamId>          join an existing team
say <text> / tsay <text>    global / team chat
pause / resume              toggle the global pause flag
admin <json>                merge a partial ruleset
status / help / quit";

fn coordinate(token: Option<&str>, axis: &str) -> Result<f64, String> {
    let token = token.ok_or_else(|| format!("missing {} coordinate", axis))?;
    token
        .parse::<f64>()
        .map_err(|_| format!("bad {} coordinate: {}", axis, token))
}

fn single_id<'a>(mut args: impl Iterator<Item = &'a str>, what: &str) -> Result<String, String> {
    args.next()
        .map(str::to_string)
        .ok_or_else(|| format!("usage: {} <voxelId>", what))
}

fn admin_patch(value: Value) -> Result<Input, String> {
    match value {
        Value::Object(config) => Ok(Input::Send(ClientMessage::AdminUpdateConfig { config })),
        _ => Err("admin expects a JSON object".to_string()),
    }
}

/// Parses one console line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Input>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let mut args = rest.split_whitespace();

    let input = match verb.to_ascii_lowercase().as_str() {
        "place" | "p" => {
            let x = coordinate(args.next(), "x")?;
            let y = coordinate(args.next(), "y")?;
            let z = coordinate(args.next(), "z")?;
            // Aim at the middle of the cell so the server lands on the same one.
            let cell = CellKey::from_position(&Vector3::new(x, y, z));
            Input::Send(ClientMessage::PlaceVoxel {
                pos: cell.center(),
                color: args.next().map(str::to_string),
            })
        }
        "attack" | "a" => Input::Send(ClientMessage::AttackVoxel {
            voxel_id: single_id(args, "attack")?,
        }),
        "fortify" | "f" => Input::Send(ClientMessage::FortifyVoxel {
            voxel_id: single_id(args, "fortify")?,
        }),
        "destroy" | "d" => Input::Send(ClientMessage::DestroyVoxel {
            voxel_id: single_id(args, "destroy")?,
        }),
        "repair" | "r" => Input::Send(ClientMessage::RepairVoxels {
            voxel_id: single_id(args, "repair")?,
        }),
        "team" => match args.next() {
            Some("create") => {
                let name = rest.trim_start_matches("create").trim();
                Input::Send(ClientMessage::CreateTeam {
                    name: name.to_string(),
                })
            }
            Some("join") => Input::Send(ClientMessage::JoinTeam {
                team_id: args
                    .next()
                    .map(str::to_string)
                    .ok_or("usage: team join <teamId>")?,
            }),
            _ => return Err("usage: team create <name> | team join <teamId>".to_string()),
        },
        "say" | "tsay" => Input::Send(ClientMessage::Chat {
            message: rest.to_string(),
            team_only: verb.eq_ignore_ascii_case("tsay"),
        }),
        "pause" => admin_patch(json!({ "isPaused": true }))?,
        "resume" => admin_patch(json!({ "isPaused": false }))?,
        "admin" => {
            let value: Value =
                serde_json::from_str(rest).map_err(|e| format!("bad JSON: {}", e))?;
            admin_patch(value)?
        }
        "status" | "s" => Input::Status,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        other => return Err(format!("unknown command: {} (try help)", other)),
    };

    Ok(Some(input))
}
