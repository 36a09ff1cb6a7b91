//! Built-in Active Directory attribute table

use super::TokenFormat;
use TokenFormat::*;

/// (name, OID, format)
pub(super) const ATTRIBUTES: &[(&str, &str, TokenFormat)] = &[
    // Naming
    ("cn", "2.5.4.3", StringUnicode),
    ("sn", "2.5.4.4", StringUnicode),
    ("givenName", "2.5.4.42", StringUnicode),
    ("name", "1.2.840.113556.1.4.1", StringUnicode),
    ("displayName", "1.2.840.113556.1.2.13", StringUnicode),
    ("description", "2.5.4.13", StringUnicode),
    ("title", "2.5.4.12", StringUnicode),
    ("department", "1.2.840.113556.1.2.141", StringUnicode),
    ("company", "1.2.840.113556.1.2.146", StringUnicode),
    ("telephoneNumber", "2.5.4.20", StringUnicode),
    ("mail", "0.9.2342.19200300.100.1.3", StringUnicode),
    ("uid", "0.9.2342.19200300.100.1.1", StringUnicode),
    ("dc", "0.9.2342.19200300.100.1.25", StringUnicode),
    ("ou", "2.5.4.11", StringUnicode),
    ("sAMAccountName", "1.2.840.113556.1.4.221", StringUnicode),
    ("userPrincipalName", "1.2.840.113556.1.4.656", StringUnicode),
    ("servicePrincipalName", "1.2.840.113556.1.4.771", StringUnicode),
    ("dNSHostName", "1.2.840.113556.1.4.619", StringUnicode),
    ("operatingSystem", "1.2.840.113556.1.4.363", StringUnicode),
    ("operatingSystemVersion", "1.2.840.113556.1.4.365", StringUnicode),
    ("homeDirectory", "1.2.840.113556.1.4.44", StringUnicode),
    ("scriptPath", "1.2.840.113556.1.4.62", StringUnicode),
    ("userWorkstations", "1.2.840.113556.1.4.86", StringUnicode),
    ("msDS-AllowedToDelegateTo", "1.2.840.113556.1.4.1787", StringUnicode),
    ("objectClass", "2.5.4.0", StringUnicode),
    ("aNR", "1.2.840.113556.1.4.1208", StringUnicode),
    // Distinguished names
    ("distinguishedName", "2.5.4.49", DnString),
    ("objectCategory", "1.2.840.113556.1.4.782", DnString),
    ("member", "2.5.4.31", DnString),
    ("memberOf", "1.2.840.113556.1.2.102", DnString),
    ("manager", "0.9.2342.19200300.100.1.10", DnString),
    ("directReports", "1.2.840.113556.1.2.436", DnString),
    ("managedBy", "1.2.840.113556.1.4.653", DnString),
    // Enumerations and counters
    ("sAMAccountType", "1.2.840.113556.1.4.302", IntEnumeration),
    ("primaryGroupID", "1.2.840.113556.1.4.98", IntEnumeration),
    ("adminCount", "1.2.840.113556.1.4.150", IntEnumeration),
    ("badPwdCount", "1.2.840.113556.1.4.12", IntEnumeration),
    ("logonCount", "1.2.840.113556.1.4.169", IntEnumeration),
    ("uSNChanged", "1.2.840.113556.1.2.120", IntEnumeration),
    ("uSNCreated", "1.2.840.113556.1.2.19", IntEnumeration),
    // Time intervals
    ("pwdLastSet", "1.2.840.113556.1.4.96", IntTimeInterval),
    ("lastLogon", "1.2.840.113556.1.4.52", IntTimeInterval),
    ("lastLogonTimestamp", "1.2.840.113556.1.4.1696", IntTimeInterval),
    ("accountExpires", "1.2.840.113556.1.4.159", IntTimeInterval),
    ("badPasswordTime", "1.2.840.113556.1.4.49", IntTimeInterval),
    ("lockoutTime", "1.2.840.113556.1.4.662", IntTimeInterval),
    // Bit flags
    ("userAccountControl", "1.2.840.113556.1.4.8", Bitwise),
    ("groupType", "1.2.840.113556.1.4.750", Bitwise),
    ("systemFlags", "1.2.840.113556.1.4.375", Bitwise),
    ("instanceType", "1.2.840.113556.1.2.1", Bitwise),
    ("trustAttributes", "1.2.840.113556.1.4.470", Bitwise),
    ("msDS-SupportedEncryptionTypes", "1.2.840.113556.1.4.1963", Bitwise),
    // Binary and generalized time
    ("objectSid", "1.2.840.113556.1.4.146", Unknown),
    ("objectGUID", "1.2.840.113556.1.4.2", Unknown),
    ("nTSecurityDescriptor", "1.2.840.113556.1.2.281", Unknown),
    ("whenCreated", "1.2.840.113556.1.2.2", Unknown),
    ("whenChanged", "1.2.840.113556.1.2.3", Unknown),
];
