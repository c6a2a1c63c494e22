//! Team membership and leadership.

use shared::{new_id, PlayerId, Team, MAX_TEAM_MEMBERS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    Full,
    UnknownTeam,
}

/// Teams in creation order. Teams are never disbanded.
#[derive(Debug, Default, Clone)]
pub struct TeamRegistry {
    teams: Vec<Team>,
}

impl TeamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn get(&self, team_id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    /// Creates a team led by `leader`, who becomes its only member.
    pub fn create(&mut self, name: String, leader: PlayerId) -> &Team {
        let team = Team::new(new_id(), name, leader);
        self.teams.push(team);
        &self.teams[self.teams.len() - 1]
    }

    /// Appends `player` to the team's member list.
    ///
    /// Membership elsewhere is not checked and repeat joins append again.
    pub fn join(&mut self, team_id: &str, player: PlayerId) -> JoinOutcome {
        let Some(team) = self.teams.iter_mut().find(|t| t.id == team_id) else {
            return JoinOutcome::UnknownTeam;
        };
        if team.members.len() >= MAX_TEAM_MEMBERS {
            return JoinOutcome::Full;
        }
        team.members.push(player);
        JoinOutcome::Joined
    }

    /// Whether `leader` leads some team that counts `member` among its members.
    pub fn leads_member(&self, leader: &str, member: &str) -> bool {
        self.teams
            .iter()
            .any(|t| t.leader_id == leader && t.has_member(member))
    }

    pub fn all(&self) -> Vec<Team> {
        self.teams.clone()
    }
}
