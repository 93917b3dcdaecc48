// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::DocumentVariant;
use crate::workflow::{LoadingFlag, Notice};

/// Screen-level selection state. None of this is part of the quote itself.
#[derive(Debug, Clone)]
pub struct SheetState {
    pub expanded_category: Option<String>,
    pub client_panel_open: bool,
    pub variant: Option<DocumentVariant>,
    pub generating: LoadingFlag,
    pub status: Option<Notice>,
}

impl Default for SheetState {
    fn default() -> Self {
        Self {
            expanded_category: None,
            client_panel_open: true,
            variant: None,
            generating: LoadingFlag::default(),
            status: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetCommand {
    ToggleCategory(String),
    ToggleClientPanel,
    ToggleVariant(DocumentVariant),
    ShowNotice(Notice),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetEvent {
    CategoryExpanded(Option<String>),
    ClientPanelToggled(bool),
    VariantChanged(Option<DocumentVariant>),
    StatusUpdated(Notice),
    StatusCleared,
}

impl SheetState {
    pub fn dispatch(&mut self, command: SheetCommand) -> Vec<SheetEvent> {
        match command {
            SheetCommand::ToggleCategory(name) => {
                let already_open = self.expanded_category.as_deref() == Some(name.as_str());
                self.expanded_category = if already_open { None } else { Some(name) };
                vec![SheetEvent::CategoryExpanded(self.expanded_category.clone())]
            }
            SheetCommand::ToggleClientPanel => {
                self.client_panel_open = !self.client_panel_open;
                vec![SheetEvent::ClientPanelToggled(self.client_panel_open)]
            }
            SheetCommand::ToggleVariant(variant) => {
                self.variant = if self.variant == Some(variant) {
                    None
                } else {
                    Some(variant)
                };
                vec![SheetEvent::VariantChanged(self.variant)]
            }
            SheetCommand::ShowNotice(notice) => {
                self.status = Some(notice.clone());
                vec![SheetEvent::StatusUpdated(notice)]
            }
            SheetCommand::ClearStatus => {
                self.status = None;
                vec![SheetEvent::StatusCleared]
            }
        }
    }

    pub fn is_generating(&self) -> bool {
        self.generating.is_set()
    }

    pub fn is_expanded(&self, category: &str) -> bool {
        self.expanded_category.as_deref() == Some(category)
    }
}
