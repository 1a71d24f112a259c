/// Built-in `(pattern, reason)` pairs for the command filter.
///
/// Catches the obvious foot-guns (privilege escalation, wiping or reformatting
/// the machine, writes into system directories). It is a speed bump, not a
/// sandbox: the workspace guard is what keeps file creation contained.
const BLOCKLIST: &[(&str, &str)] = &[
    (r"(?i)\bsudo\b", "Privilege escalation (sudo) not allowed"),
    (r"(?i)\bsu\b\s", "Privilege escalation (su) not allowed"),
    (r"(?i)\bdoas\b", "Privilege escalation (doas) not allowed"),
    (r"rm\s+(-[^\s]*)?(\s+-[^\s]*)?\s+/($|\s)", "Recursive deletion at root not allowed"),
    (r"rm\s+(-[^\s]*)?(\s+-[^\s]*)?\s+/\*", "Recursive deletion at root not allowed"),
    (r">\s*/etc/", "Write to /etc not allowed"),
    (r">\s*/usr/", "Write to /usr not allowed"),
    (r">\s*/boot/", "Write to /boot not allowed"),
    (r">\s*/sys/", "Write to /sys not allowed"),
    (r">\s*/proc/", "Write to /proc not allowed"),
    (r"(?i)\bmkfs\b", "Filesystem formatting not allowed"),
    (r"(?i)\bdd\b\s.*of=/dev/", "Direct device writes not allowed"),
    (r":\(\)\s*\{.*\}", "Fork bomb pattern detected"),
    (r"(?i)\bshutdown\b", "System shutdown not allowed"),
    (r"(?i)\breboot\b", "System reboot not allowed"),
    (r"(?i)\bhalt\b", "System halt not allowed"),
    (r"(?i)\bpoweroff\b", "System poweroff not allowed"),
    (r"chmod\s.*\s/($|\s|[a-z])", "Permission changes at root level not allowed"),
    (r"chown\s.*\s/($|\s|[a-z])", "Ownership changes at root level not allowed"),
];

/// The default blocklist in the owned form config merging works with.
pub fn default_blocklist() -> Vec<(String, String)> {
    BLOCKLIST
        .iter()
        .map(|(pattern, reason)| (pattern.to_string(), reason.to_string()))
        .collect()
}
