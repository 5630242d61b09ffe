// Lobby roster entries, mutated in place as update events arrive.

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerEntry {
    pub name: String,
    pub address: String,
    pub ping: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RobotEntry {
    pub id: String,
    pub address: String,
    pub owner: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Default)]
pub struct Roster {
    pub players: Vec<PlayerEntry>,
    pub robots: Vec<RobotEntry>,
}

impl Roster {
    pub fn set_players(&mut self, players: Vec<PlayerEntry>) {
        self.players = players;
    }

    pub fn set_robots(&mut self, robots: Vec<RobotEntry>) {
        self.robots = robots;
    }

    pub fn has_player(&self, name: &str) -> bool {
        self.players.iter().any(|p| p.name == name)
    }

    pub fn player_mut(&mut self, name: &str) -> Option<&mut PlayerEntry> {
        self.players.iter_mut().find(|p| p.name == name)
    }

    pub fn robot_mut(&mut self, id: &str) -> Option<&mut RobotEntry> {
        self.robots.iter_mut().find(|r| r.id == id)
    }

    pub fn robot_by_address_mut(&mut self, address: &str) -> Option<&mut RobotEntry> {
        self.robots.iter_mut().find(|r| r.address == address)
    }

    pub fn remove_robot(&mut self, id: &str) {
        self.robots.retain(|r| r.id != id);
    }

    /// Clears ownership on any robot owned by the named player. Used when a
    /// player leaves the lobby.
    pub fn clear_owner(&mut self, owner: &str) {
        for robot in &mut self.robots {
            if robot.owner.as_deref() == Some(owner) {
                robot.owner = None;
            }
        }
    }
}
