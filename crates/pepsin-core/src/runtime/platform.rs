//! Host platform profile for interpreter and package-manager naming

use std::fmt;

/// Host operating system family, resolved once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Posix,
    MacOs,
    Windows,
}

impl Platform {
    /// Platform the binary was compiled for
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Posix
        }
    }

    /// Parse a `sys.platform`-style identifier; unknown values fall back to posix
    pub fn from_identifier(id: &str) -> Self {
        match id {
            "darwin" => Platform::MacOs,
            "win32" | "cygwin" | "windows" => Platform::Windows,
            _ => Platform::Posix,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Posix => "posix",
            Platform::MacOs => "macOS",
            Platform::Windows => "windows",
        }
    }

    /// System-wide interpreter and package manager names
    pub fn system_executables(&self) -> (&'static str, &'static str) {
        match self {
            Platform::Windows => ("python", "pip"),
            Platform::Posix | Platform::MacOs => ("python3", "pip3"),
        }
    }

    /// Directory inside an environment that holds its executables
    pub fn script_dir(&self) -> &'static str {
        match self {
            Platform::Windows => "Scripts",
            Platform::Posix | Platform::MacOs => "bin",
        }
    }

    pub fn exe_suffix(&self) -> &'static str {
        match self {
            Platform::Windows => ".exe",
            Platform::Posix | Platform::MacOs => "",
        }
    }

    /// Separator between entries of `PATH`
    pub fn path_separator(&self) -> char {
        match self {
            Platform::Windows => ';',
            Platform::Posix | Platform::MacOs => ':',
        }
    }

    /// Executable file name for a tool living in an environment's script dir
    pub fn executable_name(&self, tool: &str) -> String {
        format!("{}{}", tool, self.exe_suffix())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
