use common::DomainError;
use std::str::FromStr;

pub const REGISTRATION_MODULE: &str = "ComponentService/Registration";
pub const MANAGER_MODULE: &str = "ComponentService/Manager";
pub const CONFIGURATION_MODULE: &str = "ComponentService/Configuration";
pub const REPORT_MODULE: &str = "ComponentService/Report";

/// Second topic segment selecting the router
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Registration,
    Manager,
    Configuration,
    Report,
    Data,
}

impl FromStr for Domain {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Registration" => Ok(Domain::Registration),
            "Manager" => Ok(Domain::Manager),
            "Configuration" => Ok(Domain::Configuration),
            "Report" => Ok(Domain::Report),
            "Data" => Ok(Domain::Data),
            other => Err(DomainError::UnknownDomain(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerCommand {
    GetComponents,
    GetComponent,
    GetComponentsTypes,
    GetComponentType,
    UpdateComponent,
    DeleteComponents,
    ExecuteCommand,
}

impl FromStr for ManagerCommand {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GetComponents" => Ok(ManagerCommand::GetComponents),
            "GetComponent" => Ok(ManagerCommand::GetComponent),
            "GetComponentsTypes" => Ok(ManagerCommand::GetComponentsTypes),
            "GetComponentType" => Ok(ManagerCommand::GetComponentType),
            "UpdateComponent" => Ok(ManagerCommand::UpdateComponent),
            "DeleteComponents" => Ok(ManagerCommand::DeleteComponents),
            "ExecuteCommand" => Ok(ManagerCommand::ExecuteCommand),
            other => Err(DomainError::UnknownCommand(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationCommand {
    SetConfig,
    GetConfig,
}

impl FromStr for ConfigurationCommand {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SetConfig" => Ok(ConfigurationCommand::SetConfig),
            "GetConfig" => Ok(ConfigurationCommand::GetConfig),
            other => Err(DomainError::UnknownCommand(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportCommand {
    SetReport,
    GetReport,
}

impl FromStr for ReportCommand {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SetReport" => Ok(ReportCommand::SetReport),
            "GetReport" => Ok(ReportCommand::GetReport),
            other => Err(DomainError::UnknownCommand(other.to_string())),
        }
    }
}
