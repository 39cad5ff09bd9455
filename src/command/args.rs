use serde::Serialize;

/// One `docker run` option, with an optional value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flag {
    pub short: Option<&'static str>,
    pub long: &'static str,
    pub value: Option<String>,
}

impl Flag {
    pub fn switch(long: &'static str) -> Self {
        Self {
            short: None,
            long,
            value: None,
        }
    }

    pub fn new(long: &'static str, value: impl Into<String>) -> Self {
        Self {
            short: None,
            long,
            value: Some(value.into()),
        }
    }

    pub fn with_short(mut self, short: &'static str) -> Self {
        self.short = Some(short);
        self
    }

    /// The option name as it should be printed.
    pub fn name(&self, long_flags: bool) -> &'static str {
        match self.short {
            Some(short) if !long_flags => short,
            _ => self.long,
        }
    }

    pub fn tokens(&self, long_flags: bool) -> Vec<String> {
        let mut tokens = vec![self.name(long_flags).to_string()];
        tokens.extend(self.value.clone());
        tokens
    }
}

/// A reconstructed `docker run` invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunCommand {
    pub flags: Vec<Flag>,
    pub image: String,
    pub args: Vec<String>,
    /// Extra docker invocations to run afterwards, without the binary name.
    pub followups: Vec<Vec<String>>,
}

impl RunCommand {
    /// Arguments following the docker binary: `run`, options, image, command.
    pub fn argv(&self, long_flags: bool) -> Vec<String> {
        let mut argv = vec!["run".to_string()];
        for flag in &self.flags {
            argv.extend(flag.tokens(long_flags));
        }
        argv.push(self.image.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }

    /// All values given to `long`, in order.
    pub fn values(&self, long: &str) -> Vec<&str> {
        self.flags
            .iter()
            .filter(|f| f.long == long)
            .filter_map(|f| f.value.as_deref())
            .collect()
    }

    pub fn has(&self, long: &str) -> bool {
        self.flags.iter().any(|f| f.long == long)
    }
}
