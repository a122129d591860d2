// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .help("Assignment id")
}

fn performance_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("arrival").long("arrival").help("Arrival time HH:MM"))
        .arg(
            Arg::new("departure")
                .long("departure")
                .help("Departure time HH:MM"),
        )
        .arg(Arg::new("drinks").long("drinks").help("Drinks sold"))
        .arg(
            Arg::new("special")
                .long("special")
                .help("Special commissions booked to the venue"),
        )
        .arg(Arg::new("bonus").long("bonus").help("Manual bonus"))
        .arg(Arg::new("malus").long("malus").help("Manual deduction"))
}

fn payroll_filters(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("status")
            .long("status")
            .help("ongoing|ended|archived"),
    )
    .arg(Arg::new("template").long("template"))
    .arg(Arg::new("venue").long("venue"))
    .arg(
        Arg::new("nickname")
            .long("nickname")
            .help("Substring match on staff nickname"),
    )
    .arg(Arg::new("manager").long("manager"))
    .arg(
        Arg::new("from")
            .long("from")
            .help("Contracts running on or after YYYY-MM-DD"),
    )
    .arg(
        Arg::new("to")
            .long("to")
            .help("Contracts started on or before YYYY-MM-DD"),
    )
}

pub fn build_cli() -> Command {
    Command::new("paydesk")
        .version(clap::crate_version!())
        .about("Staff dispatch contracts, daily performance and payroll")
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("config")
                .about("Defaults used for new contract templates")
                .subcommand(Command::new("get").arg(Arg::new("key").long("key").required(true)))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").long("key").required(true))
                        .arg(Arg::new("value").long("value").required(true)),
                )
                .subcommand(Command::new("list")),
        )
        .subcommand(
            Command::new("staff")
                .about("Staff profiles")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("nickname").long("nickname").required(true))
                        .arg(
                            Arg::new("status")
                                .long("status")
                                .default_value("Active")
                                .help("Active|Working|Quiet|Screening"),
                        )
                        .arg(Arg::new("phone").long("phone"))
                        .arg(Arg::new("notes").long("notes")),
                )
                .subcommand(json_args(Command::new("list")))
                .subcommand(
                    Command::new("rm").arg(Arg::new("nickname").long("nickname").required(true)),
                ),
        )
        .subcommand(
            Command::new("venue")
                .about("Venues staff are dispatched to")
                .subcommand(Command::new("add").arg(Arg::new("name").long("name").required(true)))
                .subcommand(Command::new("list"))
                .subcommand(Command::new("rm").arg(Arg::new("name").long("name").required(true))),
        )
        .subcommand(
            Command::new("template")
                .about("Contract types and their payroll rules")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("days")
                                .long("days")
                                .required(true)
                                .help("Contracted length in days"),
                        )
                        .arg(
                            Arg::new("cutoff")
                                .long("cutoff")
                                .help("Late arrival cutoff HH:MM"),
                        )
                        .arg(
                            Arg::new("first_penalty")
                                .long("first-penalty")
                                .help("Penalty for the first late minute"),
                        )
                        .arg(
                            Arg::new("additional_penalty")
                                .long("additional-penalty")
                                .help("Penalty per late minute after the first"),
                        )
                        .arg(
                            Arg::new("commission")
                                .long("commission")
                                .help("Paid to staff per drink"),
                        )
                        .arg(
                            Arg::new("drink_revenue")
                                .long("drink-revenue")
                                .help("Booked to the venue per drink"),
                        ),
                )
                .subcommand(json_args(Command::new("list")))
                .subcommand(Command::new("rm").arg(Arg::new("name").long("name").required(true))),
        )
        .subcommand(
            Command::new("assignment")
                .about("Work contracts")
                .subcommand(
                    Command::new("create")
                        .arg(Arg::new("staff").long("staff").required(true))
                        .arg(Arg::new("venue").long("venue").required(true))
                        .arg(Arg::new("template").long("template").required(true))
                        .arg(
                            Arg::new("start")
                                .long("start")
                                .required(true)
                                .help("YYYY-MM-DD"),
                        )
                        .arg(
                            Arg::new("salary")
                                .long("salary")
                                .required(true)
                                .help("Base salary for the whole contract"),
                        )
                        .arg(Arg::new("role").long("role").default_value("Dancer"))
                        .arg(Arg::new("manager").long("manager")),
                )
                .subcommand(json_args(
                    Command::new("list").arg(Arg::new("status").long("status")),
                ))
                .subcommand(
                    Command::new("end")
                        .about("End an ongoing contract early")
                        .arg(id_arg())
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .help("Last working day, defaults to today"),
                        ),
                )
                .subcommand(
                    Command::new("finalize")
                        .arg(id_arg())
                        .arg(
                            Arg::new("status")
                                .long("status")
                                .default_value("archived")
                                .help("ended|archived"),
                        ),
                )
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("perf")
                .about("Daily performance records")
                .subcommand(performance_args(
                    Command::new("record")
                        .arg(id_arg())
                        .arg(Arg::new("date").long("date").required(true)),
                ))
                .subcommand(json_args(performance_args(
                    Command::new("preview").arg(id_arg()),
                )))
                .subcommand(json_args(
                    Command::new("show")
                        .arg(id_arg())
                        .arg(Arg::new("date").long("date").required(true)),
                ))
                .subcommand(json_args(Command::new("list").arg(id_arg()))),
        )
        .subcommand(
            Command::new("summary")
                .about("Contract totals")
                .subcommand(json_args(Command::new("show").arg(id_arg())))
                .subcommand(
                    Command::new("recalc")
                        .arg(Arg::new("id").long("id"))
                        .arg(
                            Arg::new("all")
                                .long("all")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("id"),
                        ),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Payroll reports")
                .subcommand(json_args(payroll_filters(Command::new("payroll")))),
        )
        .subcommand(
            Command::new("export")
                .about("Export data to CSV or JSON")
                .subcommand(payroll_filters(
                    Command::new("payroll")
                        .arg(Arg::new("format").long("format").default_value("csv"))
                        .arg(Arg::new("out").long("out").required(true)),
                ))
                .subcommand(
                    Command::new("records")
                        .arg(id_arg())
                        .arg(Arg::new("format").long("format").default_value("csv"))
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check data consistency"))
}
