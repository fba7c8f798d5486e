//! Application menu template.
//!
//! The menu is described as plain data here and translated into native menus
//! by the binary. Leaves are either platform roles (About, Quit) that the
//! toolkit handles, or [`MenuCommand`]s routed to the shell.

use serde::{Deserialize, Serialize};

/// Commands the shell handles when a custom menu item is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MenuCommand {
    NewProject,
    OpenProject,
    OpenDevTools,
}

/// Items whose behavior belongs to the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformRole {
    About,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Role {
        label: String,
        role: PlatformRole,
    },
    Action {
        label: String,
        command: MenuCommand,
        /// gpui keystroke syntax, e.g. `secondary-shift-i`
        accelerator: Option<String>,
    },
    Separator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSection {
    pub name: String,
    pub items: Vec<MenuEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuTemplate {
    pub menus: Vec<MenuSection>,
}

impl MenuTemplate {
    /// App menu, File (New/Open Project) and View (Developer Tools)
    pub fn standard(app_name: &str, dev_tools_accelerator: &str) -> Self {
        Self {
            menus: vec![
                MenuSection {
                    name: app_name.to_string(),
                    items: vec![
                        MenuEntry::Role {
                            label: format!("About {}", app_name),
                            role: PlatformRole::About,
                        },
                        MenuEntry::Separator,
                        MenuEntry::Role {
                            label: "Quit".to_string(),
                            role: PlatformRole::Quit,
                        },
                    ],
                },
                MenuSection {
                    name: "File".to_string(),
                    items: vec![
                        MenuEntry::Action {
                            label: "New Project".to_string(),
                            command: MenuCommand::NewProject,
                            accelerator: None,
                        },
                        MenuEntry::Action {
                            label: "Open Project".to_string(),
                            command: MenuCommand::OpenProject,
                            accelerator: None,
                        },
                    ],
                },
                MenuSection {
                    name: "View".to_string(),
                    items: vec![MenuEntry::Action {
                        label: "Open Developer Tools".to_string(),
                        command: MenuCommand::OpenDevTools,
                        accelerator: Some(dev_tools_accelerator.to_string()),
                    }],
                },
            ],
        }
    }

    /// Every custom action with its accelerator, in menu order
    pub fn accelerators(&self) -> Vec<(MenuCommand, &str)> {
        self.actions()
            .filter_map(|(command, accelerator)| accelerator.map(|a| (command, a)))
            .collect()
    }

    /// Every custom action in menu order
    pub fn actions(&self) -> impl Iterator<Item = (MenuCommand, Option<&str>)> + '_ {
        self.menus.iter().flat_map(|menu| {
            menu.items.iter().filter_map(|item| match item {
                MenuEntry::Action {
                    command,
                    accelerator,
                    ..
                } => Some((*command, accelerator.as_deref())),
                _ => None,
            })
        })
    }
}
